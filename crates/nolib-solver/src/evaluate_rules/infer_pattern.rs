//! `infer` placeholder matching.
//!
//! When the `extends` side of a conditional carries `infer` placeholders,
//! branch selection becomes structural matching: the check type is matched
//! against the pattern and each placeholder binds the piece of the check
//! type at its position. A placeholder that matches twice accumulates a
//! union of its candidates. Function patterns support the
//! `(...args: infer R)` form, which captures the whole source parameter
//! list as a labeled tuple.

use crate::evaluate::TypeEvaluator;
use crate::subtype::is_assignable;
use crate::types::{FunctionShape, TupleElement, TypeData, TypeId, TypeParamInfo};
use nolib_common::interner::Atom;
use rustc_hash::{FxHashMap, FxHashSet};

impl TypeEvaluator<'_> {
    /// Does `ty` contain an `infer` placeholder?
    pub(crate) fn contains_infer(&self, ty: TypeId) -> bool {
        let mut found = false;
        self.for_each_infer(ty, &mut |_| found = true);
        found
    }

    /// Match `source` against `pattern`, binding `infer` placeholders into
    /// `bindings`. Returns whether the pattern matched.
    pub(crate) fn match_infer_pattern(
        &mut self,
        source: TypeId,
        pattern: TypeId,
        bindings: &mut FxHashMap<Atom, TypeId>,
    ) -> bool {
        // `any` matches every pattern; there is no structure to capture, so
        // every placeholder binds `any`.
        if source == TypeId::ANY && self.contains_infer(pattern) {
            self.bind_placeholders(pattern, TypeId::ANY, bindings);
            return true;
        }
        match self.interner.lookup(pattern) {
            Some(TypeData::Infer(info)) => {
                if let Some(constraint) = info.constraint {
                    let constraint = self.evaluate(constraint);
                    if !is_assignable(self.interner, self.defs, source, constraint) {
                        return false;
                    }
                }
                self.bind(info.name, source, bindings);
                true
            }
            Some(TypeData::Function(pattern_shape_id)) => {
                let Some(TypeData::Function(source_shape_id)) = self.interner.lookup(source)
                else {
                    return false;
                };
                let source_shape = self.interner.function_shape(source_shape_id);
                let pattern_shape = self.interner.function_shape(pattern_shape_id);
                self.match_function_pattern(&source_shape, &pattern_shape, bindings)
            }
            Some(TypeData::Tuple(pattern_list)) => {
                let Some(TypeData::Tuple(source_list)) = self.interner.lookup(source) else {
                    return false;
                };
                let source_elements = self.interner.tuple_list(source_list);
                let pattern_elements = self.interner.tuple_list(pattern_list);
                self.match_tuple_pattern(&source_elements, &pattern_elements, bindings)
            }
            Some(TypeData::Object(pattern_shape_id))
            | Some(TypeData::ObjectWithIndex(pattern_shape_id)) => {
                let Some((source_shape_id, source_shape)) = self.object_shape_of(source) else {
                    return false;
                };
                let pattern_shape = self.interner.object_shape(pattern_shape_id);
                for pattern_prop in &pattern_shape.properties {
                    match self.interner.find_property(source_shape_id, pattern_prop.name) {
                        Some(source_prop) => {
                            if !self.match_infer_pattern(
                                source_prop.type_id,
                                pattern_prop.type_id,
                                bindings,
                            ) {
                                return false;
                            }
                        }
                        None if pattern_prop.optional => {
                            self.bind_placeholders(pattern_prop.type_id, TypeId::UNKNOWN, bindings);
                        }
                        None => return false,
                    }
                }
                if let Some(pattern_index) = pattern_shape.string_index {
                    match source_shape.string_index {
                        Some(source_index) => {
                            if !self.match_infer_pattern(
                                source_index.value_type,
                                pattern_index.value_type,
                                bindings,
                            ) {
                                return false;
                            }
                        }
                        None => return false,
                    }
                }
                if let Some(pattern_index) = pattern_shape.number_index {
                    match source_shape.number_index {
                        Some(source_index) => {
                            if !self.match_infer_pattern(
                                source_index.value_type,
                                pattern_index.value_type,
                                bindings,
                            ) {
                                return false;
                            }
                        }
                        None => return false,
                    }
                }
                true
            }
            Some(TypeData::Union(list_id)) => {
                // First member pattern that matches wins; a failed attempt
                // must not leave partial bindings behind.
                let members = self.interner.type_list(list_id);
                for &member in members.iter() {
                    let mut attempt = bindings.clone();
                    if self.match_infer_pattern(source, member, &mut attempt) {
                        *bindings = attempt;
                        return true;
                    }
                }
                false
            }
            // A pattern piece without placeholder structure matches by
            // assignability.
            _ => is_assignable(self.interner, self.defs, source, pattern),
        }
    }

    /// Match function shapes. `(...args: infer R)` as the only pattern
    /// parameter captures the entire source parameter list as a tuple,
    /// keeping parameter names and optionality as element labels.
    fn match_function_pattern(
        &mut self,
        source: &FunctionShape,
        pattern: &FunctionShape,
        bindings: &mut FxHashMap<Atom, TypeId>,
    ) -> bool {
        if let [rest] = pattern.params.as_slice()
            && rest.rest
            && let Some(TypeData::Infer(info)) = self.interner.lookup(rest.type_id)
        {
            let elements: Vec<TupleElement> = source
                .params
                .iter()
                .map(|param| TupleElement {
                    type_id: param.type_id,
                    name: param.name,
                    optional: param.optional,
                    rest: param.rest,
                })
                .collect();
            let captured = self.interner.tuple(elements);
            if let Some(constraint) = info.constraint {
                let constraint = self.evaluate(constraint);
                if !is_assignable(self.interner, self.defs, captured, constraint) {
                    return false;
                }
            }
            self.bind(info.name, captured, bindings);
            return self.match_infer_pattern(source.return_type, pattern.return_type, bindings);
        }

        let mut source_index = 0;
        for pattern_param in &pattern.params {
            if pattern_param.rest {
                // The rest element type covers every remaining source
                // parameter.
                while source_index < source.params.len() {
                    let source_param = source.params[source_index];
                    if !self.match_infer_pattern(
                        source_param.type_id,
                        pattern_param.type_id,
                        bindings,
                    ) {
                        return false;
                    }
                    source_index += 1;
                }
                break;
            }
            match source.params.get(source_index).copied() {
                Some(source_param) => {
                    if !self.match_infer_pattern(
                        source_param.type_id,
                        pattern_param.type_id,
                        bindings,
                    ) {
                        return false;
                    }
                    source_index += 1;
                }
                None => {
                    // A shorter source still matches; this position has
                    // nothing to capture.
                    self.bind_placeholders(pattern_param.type_id, TypeId::UNKNOWN, bindings);
                }
            }
        }
        // A required source parameter the pattern cannot accept breaks the
        // match.
        if let Some(extra) = source.params.get(source_index)
            && !extra.optional
            && !extra.rest
        {
            return false;
        }
        self.match_infer_pattern(source.return_type, pattern.return_type, bindings)
    }

    fn match_tuple_pattern(
        &mut self,
        source_elements: &[TupleElement],
        pattern_elements: &[TupleElement],
        bindings: &mut FxHashMap<Atom, TypeId>,
    ) -> bool {
        let mut source_index = 0;
        for (position, pattern_element) in pattern_elements.iter().enumerate() {
            if pattern_element.rest
                && position == pattern_elements.len() - 1
                && let Some(TypeData::Infer(info)) = self.interner.lookup(pattern_element.type_id)
            {
                // Trailing `...infer R` captures the remaining elements as
                // a tuple.
                let remainder: Vec<TupleElement> = source_elements[source_index..].to_vec();
                let captured = self.interner.tuple(remainder);
                if let Some(constraint) = info.constraint {
                    let constraint = self.evaluate(constraint);
                    if !is_assignable(self.interner, self.defs, captured, constraint) {
                        return false;
                    }
                }
                self.bind(info.name, captured, bindings);
                return true;
            }
            if pattern_element.rest {
                while source_index < source_elements.len() {
                    if !self.match_infer_pattern(
                        source_elements[source_index].type_id,
                        pattern_element.type_id,
                        bindings,
                    ) {
                        return false;
                    }
                    source_index += 1;
                }
                continue;
            }
            match source_elements.get(source_index).copied() {
                Some(source_element) => {
                    if !self.match_infer_pattern(
                        source_element.type_id,
                        pattern_element.type_id,
                        bindings,
                    ) {
                        return false;
                    }
                    source_index += 1;
                }
                None if pattern_element.optional => {
                    self.bind_placeholders(pattern_element.type_id, TypeId::UNKNOWN, bindings);
                }
                None => return false,
            }
        }
        // Source elements past the pattern break the match unless they can
        // be absent.
        source_elements[source_index..]
            .iter()
            .all(|element| element.optional || element.rest)
    }

    /// Record a binding; a repeated placeholder accumulates a union.
    fn bind(&self, name: Atom, ty: TypeId, bindings: &mut FxHashMap<Atom, TypeId>) {
        let merged = match bindings.get(&name) {
            Some(&existing) => self.interner.union2(existing, ty),
            None => ty,
        };
        bindings.insert(name, merged);
    }

    /// Bind every placeholder in `pattern` to `ty`, for positions where the
    /// source offers no structure to capture.
    fn bind_placeholders(&self, pattern: TypeId, ty: TypeId, bindings: &mut FxHashMap<Atom, TypeId>) {
        self.for_each_infer(pattern, &mut |info| self.bind(info.name, ty, bindings));
    }

    fn for_each_infer(&self, ty: TypeId, visit: &mut dyn FnMut(TypeParamInfo)) {
        let mut visited = FxHashSet::default();
        self.for_each_infer_inner(ty, visit, &mut visited);
    }

    fn for_each_infer_inner(
        &self,
        ty: TypeId,
        visit: &mut dyn FnMut(TypeParamInfo),
        visited: &mut FxHashSet<TypeId>,
    ) {
        if !visited.insert(ty) {
            return;
        }
        let Some(data) = self.interner.lookup(ty) else {
            return;
        };
        match data {
            TypeData::Infer(info) => visit(info),
            TypeData::Intrinsic(_)
            | TypeData::Literal(_)
            | TypeData::TypeParameter(_)
            | TypeData::Lazy(_)
            | TypeData::Error => {}
            TypeData::Union(list_id) => {
                for &member in self.interner.type_list(list_id).iter() {
                    self.for_each_infer_inner(member, visit, visited);
                }
            }
            TypeData::Object(shape_id) | TypeData::ObjectWithIndex(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                for property in &shape.properties {
                    self.for_each_infer_inner(property.type_id, visit, visited);
                }
                if let Some(index) = shape.string_index {
                    self.for_each_infer_inner(index.value_type, visit, visited);
                }
                if let Some(index) = shape.number_index {
                    self.for_each_infer_inner(index.value_type, visit, visited);
                }
            }
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                for param in &shape.params {
                    self.for_each_infer_inner(param.type_id, visit, visited);
                }
                self.for_each_infer_inner(shape.return_type, visit, visited);
            }
            TypeData::Tuple(list_id) => {
                for element in self.interner.tuple_list(list_id).iter() {
                    self.for_each_infer_inner(element.type_id, visit, visited);
                }
            }
            TypeData::KeyOf(operand) => self.for_each_infer_inner(operand, visit, visited),
            TypeData::IndexAccess(object, index) => {
                self.for_each_infer_inner(object, visit, visited);
                self.for_each_infer_inner(index, visit, visited);
            }
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(cond_id);
                self.for_each_infer_inner(cond.check_type, visit, visited);
                self.for_each_infer_inner(cond.extends_type, visit, visited);
                self.for_each_infer_inner(cond.true_type, visit, visited);
                self.for_each_infer_inner(cond.false_type, visit, visited);
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                self.for_each_infer_inner(mapped.constraint, visit, visited);
                self.for_each_infer_inner(mapped.template, visit, visited);
                if let Some(name_type) = mapped.name_type {
                    self.for_each_infer_inner(name_type, visit, visited);
                }
            }
            TypeData::Application(app_id) => {
                let app = self.interner.type_application(app_id);
                self.for_each_infer_inner(app.base, visit, visited);
                for &arg in &app.args {
                    self.for_each_infer_inner(arg, visit, visited);
                }
            }
        }
    }
}
