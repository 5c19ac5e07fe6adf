//! Assignability checking.
//!
//! Implements the structural `extends` relation used by conditional types
//! and by constraint validation at application time. Operands are expected
//! in evaluated form: alias and interface references (`Lazy`) are resolved
//! here, but other unevaluated operator forms only relate by identity.
//!
//! Recursive structural types are handled coinductively: a
//! `(source, target)` pair that is already being checked is assumed
//! assignable when revisited.
//!
//! Strict-mode rules are the ones in effect under `strictNullChecks`:
//! `null` and `undefined` are not assignable to arbitrary types, and only
//! `undefined` is assignable to `void`.

use crate::def::DefinitionStore;
use crate::intern::TypeInterner;
use crate::types::{
    LiteralValue, ObjectShape, ParamInfo, PropertyInfo, TupleElement, TypeData, TypeId,
    parse_numeric_key,
};
use nolib_common::limits::MAX_ASSIGNABILITY_DEPTH;
use rustc_hash::FxHashSet;

/// One-shot assignability query.
pub fn is_assignable(
    interner: &TypeInterner,
    defs: &DefinitionStore,
    source: TypeId,
    target: TypeId,
) -> bool {
    AssignabilityChecker::new(interner, defs).is_assignable(source, target)
}

/// Reusable assignability checker carrying the in-progress pair cache.
pub struct AssignabilityChecker<'a> {
    interner: &'a TypeInterner,
    defs: &'a DefinitionStore,
    in_progress: FxHashSet<(TypeId, TypeId)>,
    depth: u32,
}

impl<'a> AssignabilityChecker<'a> {
    pub fn new(interner: &'a TypeInterner, defs: &'a DefinitionStore) -> Self {
        AssignabilityChecker {
            interner,
            defs,
            in_progress: FxHashSet::default(),
            depth: 0,
        }
    }

    /// Is `source` assignable to `target`?
    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }
        let pair = (source, target);
        if !self.in_progress.insert(pair) {
            // Already comparing this pair further up the stack: assume it
            // holds, which is the coinductive reading of recursive types.
            return true;
        }
        let result = if self.depth >= MAX_ASSIGNABILITY_DEPTH {
            true
        } else {
            self.depth += 1;
            let result = self.check(source, target);
            self.depth -= 1;
            result
        };
        self.in_progress.remove(&pair);
        result
    }

    fn check(&mut self, source: TypeId, target: TypeId) -> bool {
        // The error type relates to everything in both directions.
        if source == TypeId::ERROR || target == TypeId::ERROR {
            return true;
        }
        if target == TypeId::ANY || target == TypeId::UNKNOWN {
            return true;
        }
        if source == TypeId::ANY {
            return target != TypeId::NEVER;
        }
        if source == TypeId::NEVER {
            return true;
        }
        if source == TypeId::UNKNOWN || target == TypeId::NEVER {
            return false;
        }
        if source == TypeId::UNDEFINED && target == TypeId::VOID {
            return true;
        }

        let source = self.resolve(source);
        let target = self.resolve(target);
        if source == target {
            return true;
        }

        let Some(source_data) = self.interner.lookup(source) else {
            return false;
        };
        let Some(target_data) = self.interner.lookup(target) else {
            return false;
        };

        // Literals are assignable to their base primitive.
        if let TypeData::Literal(value) = source_data {
            let base = match value {
                LiteralValue::String(_) => TypeId::STRING,
                LiteralValue::Number(_) => TypeId::NUMBER,
                LiteralValue::Boolean(_) => TypeId::BOOLEAN,
            };
            if target == base {
                return true;
            }
        }

        // A union source needs every member assignable; a union target needs
        // some member to accept the source. Source decomposes first.
        if let TypeData::Union(list_id) = source_data {
            let members = self.interner.type_list(list_id);
            return members
                .iter()
                .all(|&member| self.is_assignable(member, target));
        }
        if let TypeData::Union(list_id) = target_data {
            let members = self.interner.type_list(list_id);
            return members
                .iter()
                .any(|&member| self.is_assignable(source, member));
        }

        // A type parameter is assignable to whatever its constraint is.
        if let TypeData::TypeParameter(info) = source_data {
            return match info.constraint {
                Some(constraint) => self.is_assignable(constraint, target),
                None => false,
            };
        }

        match (source_data, target_data) {
            (
                TypeData::Object(s_shape) | TypeData::ObjectWithIndex(s_shape),
                TypeData::Object(t_shape) | TypeData::ObjectWithIndex(t_shape),
            ) => {
                let s_shape = self.interner.object_shape(s_shape);
                let t_shape = self.interner.object_shape(t_shape);
                self.object_assignable(&s_shape, &t_shape)
            }
            (TypeData::Function(s_shape), TypeData::Function(t_shape)) => {
                let s_shape = self.interner.function_shape(s_shape);
                let t_shape = self.interner.function_shape(t_shape);
                self.function_assignable(&s_shape.params, s_shape.return_type, &t_shape.params, t_shape.return_type)
            }
            (TypeData::Tuple(s_list), TypeData::Tuple(t_list)) => {
                let s_elems = self.interner.tuple_list(s_list);
                let t_elems = self.interner.tuple_list(t_list);
                self.tuple_assignable(&s_elems, &t_elems)
            }
            _ => false,
        }
    }

    /// Width subtyping over object shapes. A target property may be missing
    /// from the source only if it is optional; a source-optional property
    /// never satisfies a required target property. `readonly` does not
    /// affect assignability.
    fn object_assignable(&mut self, s_shape: &ObjectShape, t_shape: &ObjectShape) -> bool {
        for t_prop in &t_shape.properties {
            match s_shape.properties.iter().find(|p| p.name == t_prop.name) {
                Some(s_prop) => {
                    if s_prop.optional && !t_prop.optional {
                        return false;
                    }
                    if !self.is_assignable(s_prop.type_id, t_prop.type_id) {
                        return false;
                    }
                }
                None => {
                    if !t_prop.optional {
                        return false;
                    }
                }
            }
        }
        if let Some(t_index) = t_shape.string_index {
            match s_shape.string_index {
                Some(s_index) => {
                    if !self.is_assignable(s_index.value_type, t_index.value_type) {
                        return false;
                    }
                }
                // Anonymous object shapes carry an implicit string index:
                // every declared property value must fit the target index.
                None => {
                    for s_prop in &s_shape.properties {
                        if !self.property_fits_index(*s_prop, t_index.value_type) {
                            return false;
                        }
                    }
                }
            }
            if let Some(s_number) = s_shape.number_index
                && !self.is_assignable(s_number.value_type, t_index.value_type)
            {
                return false;
            }
        }
        if let Some(t_index) = t_shape.number_index {
            match s_shape.number_index.or(s_shape.string_index) {
                Some(s_index) => {
                    if !self.is_assignable(s_index.value_type, t_index.value_type) {
                        return false;
                    }
                }
                // Only numerically named properties feed the implicit
                // number index.
                None => {
                    for s_prop in &s_shape.properties {
                        let name = self.interner.resolve_atom(s_prop.name);
                        if parse_numeric_key(&name).is_some()
                            && !self.property_fits_index(*s_prop, t_index.value_type)
                        {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// An optional property reads back as `type | undefined`, which is what
    /// its implicit index signature has to produce.
    fn property_fits_index(&mut self, prop: PropertyInfo, index_value: TypeId) -> bool {
        let value = if prop.optional {
            self.interner.union2(prop.type_id, TypeId::UNDEFINED)
        } else {
            prop.type_id
        };
        self.is_assignable(value, index_value)
    }

    /// Function assignability: parameters contravariant, returns covariant,
    /// a `void`-returning target accepts any source return, and a target
    /// rest parameter absorbs any number of source parameters.
    fn function_assignable(
        &mut self,
        s_params: &[ParamInfo],
        s_return: TypeId,
        t_params: &[ParamInfo],
        t_return: TypeId,
    ) -> bool {
        let t_unbounded = t_params.iter().any(|p| p.rest);
        if !t_unbounded {
            let s_required = s_params
                .iter()
                .filter(|p| !p.optional && !p.rest)
                .count();
            // The source may take fewer parameters than the target, never
            // require more.
            if s_required > t_params.len() {
                return false;
            }
        }
        for (index, s_param) in s_params.iter().enumerate() {
            if s_param.rest {
                // Source rest element must accept every remaining target
                // parameter.
                for t_param in t_params.iter().skip(index) {
                    if !self.is_assignable(t_param.type_id, s_param.type_id) {
                        return false;
                    }
                }
                break;
            }
            match param_type_at(t_params, index) {
                Some(t_ty) => {
                    if !self.is_assignable(t_ty, s_param.type_id) {
                        return false;
                    }
                }
                // Target has no parameter here; the source one is simply
                // never supplied, which is fine when it is optional.
                None => {
                    if !s_param.optional {
                        return false;
                    }
                }
            }
        }
        if t_return == TypeId::VOID {
            return true;
        }
        self.is_assignable(s_return, t_return)
    }

    fn tuple_assignable(&mut self, s_elems: &[TupleElement], t_elems: &[TupleElement]) -> bool {
        let t_has_rest = t_elems.iter().any(|e| e.rest);
        let s_has_rest = s_elems.iter().any(|e| e.rest);
        if !t_has_rest {
            if s_has_rest {
                return false;
            }
            if s_elems.len() > t_elems.len() {
                return false;
            }
        }
        for (index, t_el) in t_elems.iter().enumerate() {
            if t_el.rest {
                // Target rest absorbs all remaining source elements.
                for s_el in s_elems.iter().skip(index) {
                    if !self.is_assignable(s_el.type_id, t_el.type_id) {
                        return false;
                    }
                }
                return true;
            }
            match tuple_element_at(s_elems, index) {
                Some(s_el) => {
                    if s_el.optional && !t_el.optional {
                        return false;
                    }
                    if !self.is_assignable(s_el.type_id, t_el.type_id) {
                        return false;
                    }
                }
                None => {
                    if !t_el.optional {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Expand `Lazy` references to their bodies. Generic definitions used
    /// without arguments stay as written.
    fn resolve(&self, ty: TypeId) -> TypeId {
        let mut current = ty;
        // The loop bound catches aliases that reference themselves.
        for _ in 0..MAX_ASSIGNABILITY_DEPTH {
            match self.interner.lookup(current) {
                Some(TypeData::Lazy(def_id)) => {
                    let Some(info) = self.defs.get(def_id) else {
                        return TypeId::ERROR;
                    };
                    if !info.type_params.is_empty() {
                        return current;
                    }
                    current = info.body;
                }
                _ => return current,
            }
        }
        TypeId::ERROR
    }
}

fn param_type_at(params: &[ParamInfo], index: usize) -> Option<TypeId> {
    let mut position = 0;
    for param in params {
        if param.rest {
            return Some(param.type_id);
        }
        if position == index {
            return Some(param.type_id);
        }
        position += 1;
    }
    None
}

fn tuple_element_at(elements: &[TupleElement], index: usize) -> Option<TupleElement> {
    let mut position = 0;
    for element in elements {
        if element.rest {
            return Some(*element);
        }
        if position == index {
            return Some(*element);
        }
        position += 1;
    }
    None
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod subtype_tests;
