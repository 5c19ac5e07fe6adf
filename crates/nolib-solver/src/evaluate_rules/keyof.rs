//! `keyof` operator evaluation.
//!
//! With no standard library loaded there are no apparent members: `keyof` of
//! a primitive or literal type is `never`, and object keys come only from
//! declared properties and index signatures.

use crate::evaluate::TypeEvaluator;
use crate::intern::TypeInterner;
use crate::types::{IntrinsicKind, LiteralValue, TupleElement, TypeData, TypeId};
use nolib_common::interner::Atom;
use rustc_hash::FxHashSet;

/// Tracks the kinds of keys found while combining keyof results.
pub(crate) struct KeyofKeySet {
    pub has_string: bool,
    pub has_number: bool,
    pub has_symbol: bool,
    pub string_literals: FxHashSet<Atom>,
}

impl KeyofKeySet {
    pub fn new() -> Self {
        KeyofKeySet {
            has_string: false,
            has_number: false,
            has_symbol: false,
            string_literals: FxHashSet::default(),
        }
    }

    /// Record a key type. Returns `false` when the type is not a key set we
    /// can reason about (e.g. a deferred `keyof` over a type parameter).
    pub fn insert_type(&mut self, interner: &TypeInterner, type_id: TypeId) -> bool {
        let Some(data) = interner.lookup(type_id) else {
            return false;
        };
        match data {
            TypeData::Union(members) => {
                let members = interner.type_list(members);
                members
                    .iter()
                    .all(|&member| self.insert_type(interner, member))
            }
            TypeData::Intrinsic(kind) => match kind {
                IntrinsicKind::String => {
                    self.has_string = true;
                    true
                }
                IntrinsicKind::Number => {
                    self.has_number = true;
                    true
                }
                IntrinsicKind::Symbol => {
                    self.has_symbol = true;
                    true
                }
                // An empty key set contributes nothing.
                IntrinsicKind::Never => true,
                _ => false,
            },
            TypeData::Literal(LiteralValue::String(atom)) => {
                self.string_literals.insert(atom);
                true
            }
            _ => false,
        }
    }
}

impl TypeEvaluator<'_> {
    /// Recursively evaluate keyof while respecting depth limits.
    fn recurse_keyof(&mut self, operand: TypeId) -> TypeId {
        let keyof = self.interner.keyof(operand);
        self.evaluate(keyof)
    }

    /// Evaluate `keyof T`.
    pub(crate) fn evaluate_keyof(&mut self, operand: TypeId) -> TypeId {
        // CRITICAL: Handle union operands before general evaluation.
        // keyof (A | B) = the keys present in every member, computed as an
        // explicit key-set intersection since the type universe carries no
        // intersection form.
        if let Some(TypeData::Union(members)) = self.interner.lookup(operand) {
            let member_list = self.interner.type_list(members);
            let mut key_types: Vec<TypeId> = Vec::with_capacity(member_list.len());
            for &member in member_list.iter() {
                key_types.push(self.recurse_keyof(member));
            }
            return match self.intersect_keyof_sets(&key_types) {
                Some(intersection) => intersection,
                None => {
                    // A member's key set is still unresolved; defer the
                    // whole operation.
                    if key_types
                        .iter()
                        .any(|&keys| self.contains_type_parameters(keys))
                    {
                        self.interner.keyof(operand)
                    } else {
                        TypeId::NEVER
                    }
                }
            };
        }

        let evaluated = self.evaluate(operand);
        let Some(data) = self.interner.lookup(evaluated) else {
            return TypeId::NEVER;
        };

        match data {
            TypeData::Object(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                if shape.properties.is_empty() {
                    return TypeId::NEVER;
                }
                let key_types: Vec<TypeId> = shape
                    .properties
                    .iter()
                    .map(|p| self.interner.literal_string_atom(p.name))
                    .collect();
                self.interner.union(key_types)
            }
            TypeData::ObjectWithIndex(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                let mut key_types: Vec<TypeId> = shape
                    .properties
                    .iter()
                    .map(|p| self.interner.literal_string_atom(p.name))
                    .collect();
                // A string index admits number keys too (numeric keys are
                // looked up as strings).
                if shape.string_index.is_some() {
                    key_types.push(TypeId::STRING);
                    key_types.push(TypeId::NUMBER);
                } else if shape.number_index.is_some() {
                    key_types.push(TypeId::NUMBER);
                }
                if key_types.is_empty() {
                    TypeId::NEVER
                } else {
                    self.interner.union(key_types)
                }
            }
            TypeData::Tuple(elements) => {
                let elements = self.interner.tuple_list(elements);
                let mut key_types: Vec<TypeId> = Vec::new();
                if self
                    .append_tuple_indices(&elements, 0, &mut key_types)
                    .is_none()
                {
                    // A rest element opens the tuple to arbitrary indices.
                    key_types.push(TypeId::NUMBER);
                }
                if key_types.is_empty() {
                    return TypeId::NEVER;
                }
                self.interner.union(key_types)
            }
            TypeData::Intrinsic(kind) => match kind {
                // keyof any = string | number | symbol
                IntrinsicKind::Any => {
                    self.interner
                        .union3(TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL)
                }
                // Without lib declarations nothing else has members:
                // keyof string is never because no String interface exists.
                _ => TypeId::NEVER,
            },
            TypeData::Literal(_) | TypeData::Function(_) => TypeId::NEVER,
            TypeData::Lazy(def_id) => match self.defs.get(def_id) {
                // A generic reference without arguments cannot expand.
                Some(info) if info.type_params.is_empty() => self.recurse_keyof(info.body),
                Some(_) => self.interner.keyof(evaluated),
                None => TypeId::ERROR,
            },
            // Unresolved operand: keep the operation deferred until
            // instantiation provides a concrete type.
            TypeData::TypeParameter(_)
            | TypeData::Infer(_)
            | TypeData::KeyOf(_)
            | TypeData::IndexAccess(..)
            | TypeData::Conditional(_)
            | TypeData::Mapped(_)
            | TypeData::Application(_) => self.interner.keyof(evaluated),
            TypeData::Union(_) => self.recurse_keyof(evaluated),
            TypeData::Error => TypeId::ERROR,
        }
    }

    /// Append tuple indices as string literal keys. Returns `None` if a
    /// rest element prevents fixed indexing from that point on.
    pub(crate) fn append_tuple_indices(
        &self,
        elements: &[TupleElement],
        base: usize,
        out: &mut Vec<TypeId>,
    ) -> Option<usize> {
        let mut index = base;
        for element in elements {
            if element.rest {
                match self.interner.lookup(element.type_id) {
                    Some(TypeData::Tuple(rest_elements)) => {
                        let rest_elements = self.interner.tuple_list(rest_elements);
                        match self.append_tuple_indices(&rest_elements, index, out) {
                            Some(next) => {
                                index = next;
                                continue;
                            }
                            None => return None,
                        }
                    }
                    _ => return None,
                }
            }
            out.push(self.interner.literal_string(&index.to_string()));
            index += 1;
        }
        Some(index)
    }

    /// Intersect several keyof results. Returns `None` if any of them is
    /// not a representable key set.
    pub(crate) fn intersect_keyof_sets(&self, key_sets: &[TypeId]) -> Option<TypeId> {
        let mut parsed_sets = Vec::with_capacity(key_sets.len());
        for &key_set in key_sets {
            let mut parsed = KeyofKeySet::new();
            if !parsed.insert_type(self.interner, key_set) {
                return None;
            }
            parsed_sets.push(parsed);
        }

        let mut all_string = true;
        let mut string_possible = true;
        let mut common_literals: Option<FxHashSet<Atom>> = None;
        let mut all_number = true;
        let mut all_symbol = true;

        for set in &parsed_sets {
            if set.has_string {
                // A string key set admits every literal, so it does not
                // narrow the literal overlap.
            } else {
                all_string = false;
                if set.string_literals.is_empty() {
                    string_possible = false;
                } else {
                    common_literals = Some(match common_literals {
                        Some(mut existing) => {
                            existing.retain(|atom| set.string_literals.contains(atom));
                            existing
                        }
                        None => set.string_literals.clone(),
                    });
                }
            }
            if !set.has_number {
                all_number = false;
            }
            if !set.has_symbol {
                all_symbol = false;
            }
        }

        let mut result_keys = Vec::new();
        if string_possible {
            if all_string {
                result_keys.push(TypeId::STRING);
            } else if let Some(common) = common_literals {
                for atom in common {
                    result_keys.push(self.interner.literal_string_atom(atom));
                }
            }
        }
        if all_number {
            result_keys.push(TypeId::NUMBER);
        }
        if all_symbol {
            result_keys.push(TypeId::SYMBOL);
        }

        Some(self.interner.union(result_keys))
    }
}
