//! Indexed access evaluation: `T[K]`.
//!
//! Both operands evaluate first. The access distributes over unions on
//! either side, reads optional properties as `type | undefined`, and
//! resolves numeric keys against tuples and index signatures. A key that
//! cannot be resolved poisons the access with the error type.

use crate::evaluate::TypeEvaluator;
use crate::types::{LiteralValue, TypeData, TypeId, number_key_string, parse_numeric_key};
use nolib_common::limits::MAX_DISTRIBUTION_SIZE;

impl TypeEvaluator<'_> {
    pub(crate) fn evaluate_index_access(&mut self, object: TypeId, index: TypeId) -> TypeId {
        let object = self.evaluate(object);
        let index = self.evaluate(index);
        if object == TypeId::ERROR || index == TypeId::ERROR {
            return TypeId::ERROR;
        }
        if index == TypeId::NEVER {
            return TypeId::NEVER;
        }
        if self.contains_type_parameters(object) || self.contains_type_parameters(index) {
            return self.interner.index_access(object, index);
        }
        // T[A | B] = T[A] | T[B]
        if let Some(TypeData::Union(list_id)) = self.interner.lookup(index) {
            let members = self.interner.type_list(list_id);
            if members.len() > MAX_DISTRIBUTION_SIZE {
                return TypeId::ERROR;
            }
            let parts = members
                .iter()
                .map(|&member| self.evaluate_index_access(object, member))
                .collect();
            return self.interner.union(parts);
        }
        // (A | B)[K] = A[K] | B[K]
        if let Some(TypeData::Union(list_id)) = self.interner.lookup(object) {
            let members = self.interner.type_list(list_id);
            if members.len() > MAX_DISTRIBUTION_SIZE {
                return TypeId::ERROR;
            }
            let parts = members
                .iter()
                .map(|&member| self.evaluate_index_access(member, index))
                .collect();
            return self.interner.union(parts);
        }
        self.index_access_single(object, index)
    }

    fn index_access_single(&mut self, object: TypeId, index: TypeId) -> TypeId {
        if object == TypeId::ANY {
            return TypeId::ANY;
        }
        if let Some(TypeData::Tuple(list_id)) = self.interner.lookup(object) {
            return self.tuple_access(list_id, index);
        }
        let Some((shape_id, shape)) = self.object_shape_of(object) else {
            return TypeId::ERROR;
        };
        match self.interner.lookup(index) {
            Some(TypeData::Literal(LiteralValue::String(atom))) => {
                if let Some(property) = self.interner.find_property(shape_id, atom) {
                    let value = self.evaluate(property.type_id);
                    return if property.optional {
                        self.interner.union2(value, TypeId::UNDEFINED)
                    } else {
                        value
                    };
                }
                let name = self.interner.resolve_atom(atom);
                if parse_numeric_key(&name).is_some()
                    && let Some(number_index) = shape.number_index
                {
                    return self.evaluate(number_index.value_type);
                }
                if let Some(string_index) = shape.string_index {
                    return self.evaluate(string_index.value_type);
                }
                TypeId::ERROR
            }
            Some(TypeData::Literal(LiteralValue::Number(value))) => {
                let name = self.interner.intern_string(&number_key_string(value.0));
                if let Some(property) = self.interner.find_property(shape_id, name) {
                    let value = self.evaluate(property.type_id);
                    return if property.optional {
                        self.interner.union2(value, TypeId::UNDEFINED)
                    } else {
                        value
                    };
                }
                if let Some(index_sig) = shape.number_index.or(shape.string_index) {
                    return self.evaluate(index_sig.value_type);
                }
                TypeId::ERROR
            }
            Some(TypeData::Intrinsic(kind)) => {
                use crate::types::IntrinsicKind;
                match kind {
                    IntrinsicKind::String => match shape.string_index {
                        Some(index_sig) => self.evaluate(index_sig.value_type),
                        None => TypeId::ERROR,
                    },
                    IntrinsicKind::Number => match shape.number_index.or(shape.string_index) {
                        Some(index_sig) => self.evaluate(index_sig.value_type),
                        None => TypeId::ERROR,
                    },
                    _ => TypeId::ERROR,
                }
            }
            _ => TypeId::ERROR,
        }
    }

    fn tuple_access(&mut self, list_id: crate::types::TupleListId, index: TypeId) -> TypeId {
        let elements = self.interner.tuple_list(list_id);
        match self.interner.lookup(index) {
            Some(TypeData::Literal(LiteralValue::Number(value))) => {
                self.tuple_element_access(&elements, value.0)
            }
            // Tuples accept their indices spelled as strings: T["0"].
            Some(TypeData::Literal(LiteralValue::String(atom))) => {
                let name = self.interner.resolve_atom(atom);
                match parse_numeric_key(&name) {
                    Some(value) => self.tuple_element_access(&elements, value),
                    None => TypeId::ERROR,
                }
            }
            // T[number] = union of every element type.
            Some(TypeData::Intrinsic(crate::types::IntrinsicKind::Number)) => {
                let mut parts: Vec<TypeId> = Vec::with_capacity(elements.len());
                let mut any_optional = false;
                for element in elements.iter() {
                    parts.push(self.evaluate(element.type_id));
                    any_optional |= element.optional;
                }
                if any_optional {
                    parts.push(TypeId::UNDEFINED);
                }
                self.interner.union(parts)
            }
            _ => TypeId::ERROR,
        }
    }

    fn tuple_element_access(&mut self, elements: &[crate::types::TupleElement], key: f64) -> TypeId {
        if key.fract() != 0.0 || key < 0.0 {
            return TypeId::ERROR;
        }
        let target = key as usize;
        let mut position = 0;
        for element in elements {
            if element.rest {
                // A rest element covers its position and everything after.
                return self.evaluate(element.type_id);
            }
            if position == target {
                let value = self.evaluate(element.type_id);
                return if element.optional {
                    self.interner.union2(value, TypeId::UNDEFINED)
                } else {
                    value
                };
            }
            position += 1;
        }
        TypeId::ERROR
    }
}
