//! Type evaluation: reducing operator forms to normal forms.
//!
//! Evaluation is total. It never reports; a step that cannot produce a type
//! yields [`TypeId::ERROR`], and the depth limit converts runaway expansion
//! into the same poison value with a flag the caller can turn into TS2589.
//!
//! Normal forms are intrinsics, literals, unions of normal forms,
//! structural shapes, and interface references. Operator forms whose
//! operands still contain free type parameters are deferred: the form is
//! rebuilt with evaluated operands and returned unreduced, to be picked up
//! again after instantiation binds the parameters.
//!
//! The individual reduction rules live in [`crate::evaluate_rules`], one
//! file per operator.

use crate::def::{DefKind, DefinitionStore};
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::types::{
    FunctionShape, IndexSignature, ObjectShape, ObjectShapeId, ParamInfo, PropertyInfo,
    TupleElement, TypeData, TypeId,
};
use nolib_common::limits::{MAX_EVALUATION_DEPTH, STACK_GROWTH, STACK_RED_ZONE};
use std::sync::Arc;
use tracing::debug;

/// Evaluate `ty` to normal form.
pub fn evaluate_type(interner: &TypeInterner, defs: &DefinitionStore, ty: TypeId) -> TypeId {
    TypeEvaluator::new(interner, defs).evaluate(ty)
}

/// Evaluation state: the shared stores plus the recursion depth.
pub struct TypeEvaluator<'a> {
    pub(crate) interner: &'a TypeInterner,
    pub(crate) defs: &'a DefinitionStore,
    depth: u32,
    hit_depth_limit: bool,
}

impl<'a> TypeEvaluator<'a> {
    pub fn new(interner: &'a TypeInterner, defs: &'a DefinitionStore) -> Self {
        TypeEvaluator {
            interner,
            defs,
            depth: 0,
            hit_depth_limit: false,
        }
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    /// Whether any evaluation on this evaluator ran into the depth limit.
    pub fn hit_depth_limit(&self) -> bool {
        self.hit_depth_limit
    }

    pub fn evaluate(&mut self, ty: TypeId) -> TypeId {
        if self.depth >= MAX_EVALUATION_DEPTH {
            debug!(type_id = ty.0, depth = self.depth, "evaluation depth limit exceeded");
            self.hit_depth_limit = true;
            return TypeId::ERROR;
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || self.evaluate_inner(ty));
        self.depth -= 1;
        result
    }

    fn evaluate_inner(&mut self, ty: TypeId) -> TypeId {
        let Some(data) = self.interner.lookup(ty) else {
            return TypeId::ERROR;
        };
        match data {
            TypeData::Intrinsic(_)
            | TypeData::Literal(_)
            | TypeData::TypeParameter(_)
            | TypeData::Infer(_)
            | TypeData::Error => ty,
            TypeData::Union(list_id) => {
                let members = self
                    .interner
                    .type_list(list_id)
                    .iter()
                    .map(|&member| self.evaluate(member))
                    .collect();
                self.interner.union(members)
            }
            TypeData::Object(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                let properties = self.evaluate_properties(&shape.properties);
                self.interner.object(properties)
            }
            TypeData::ObjectWithIndex(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                let properties = self.evaluate_properties(&shape.properties);
                let string_index = shape.string_index.map(|index| IndexSignature {
                    key_type: index.key_type,
                    value_type: self.evaluate(index.value_type),
                    readonly: index.readonly,
                });
                let number_index = shape.number_index.map(|index| IndexSignature {
                    key_type: index.key_type,
                    value_type: self.evaluate(index.value_type),
                    readonly: index.readonly,
                });
                self.interner
                    .object_with_index(properties, string_index, number_index)
            }
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                let params = shape
                    .params
                    .iter()
                    .map(|param| ParamInfo {
                        name: param.name,
                        type_id: self.evaluate(param.type_id),
                        optional: param.optional,
                        rest: param.rest,
                    })
                    .collect();
                let return_type = self.evaluate(shape.return_type);
                self.interner.function(FunctionShape {
                    params,
                    return_type,
                })
            }
            TypeData::Tuple(list_id) => {
                let elements = self
                    .interner
                    .tuple_list(list_id)
                    .iter()
                    .map(|element| TupleElement {
                        type_id: self.evaluate(element.type_id),
                        name: element.name,
                        optional: element.optional,
                        rest: element.rest,
                    })
                    .collect();
                self.interner.tuple(elements)
            }
            TypeData::KeyOf(operand) => self.evaluate_keyof(operand),
            TypeData::IndexAccess(object, index) => self.evaluate_index_access(object, index),
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(cond_id);
                self.evaluate_conditional(ty, &cond)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                self.evaluate_mapped(ty, &mapped)
            }
            TypeData::Lazy(def_id) => {
                let Some(info) = self.defs.get(def_id) else {
                    return TypeId::ERROR;
                };
                match info.kind {
                    // A bare generic reference has nothing to expand with.
                    DefKind::TypeAlias if info.type_params.is_empty() => self.evaluate(info.body),
                    DefKind::TypeAlias => ty,
                    // Interface references are normal forms; rules resolve
                    // the shape on demand. Keeps recursive interfaces finite.
                    DefKind::Interface => ty,
                }
            }
            TypeData::Application(app_id) => {
                let app = self.interner.type_application(app_id);
                self.evaluate_application(app.base, &app.args)
            }
        }
    }

    fn evaluate_properties(&mut self, properties: &[PropertyInfo]) -> Vec<PropertyInfo> {
        properties
            .iter()
            .map(|property| PropertyInfo {
                name: property.name,
                type_id: self.evaluate(property.type_id),
                optional: property.optional,
                readonly: property.readonly,
            })
            .collect()
    }

    /// Expand `Base<Args>`: arguments evaluate first, defaults fill omitted
    /// trailing arguments, then the body is instantiated and evaluated.
    ///
    /// Constraints are not checked here — evaluation is total, and
    /// constraint reporting belongs to the application entry point. An
    /// argument-count mismatch has no meaningful reduction and poisons.
    fn evaluate_application(&mut self, base: TypeId, args: &[TypeId]) -> TypeId {
        let args: Vec<TypeId> = args.iter().map(|&arg| self.evaluate(arg)).collect();
        let Some(TypeData::Lazy(def_id)) = self.interner.lookup(base) else {
            // Base is not a definition yet (e.g. still a type parameter);
            // keep the application deferred with evaluated arguments.
            return self.interner.application(base, args);
        };
        let Some(info) = self.defs.get(def_id) else {
            return TypeId::ERROR;
        };
        if args.len() > info.type_params.len() {
            return TypeId::ERROR;
        }
        let mut subst = TypeSubstitution::new();
        for (index, param) in info.type_params.iter().enumerate() {
            let arg = match args.get(index) {
                Some(&arg) => arg,
                None => match param.default {
                    Some(default) => {
                        let filled = instantiate_type(self.interner, default, &subst);
                        self.evaluate(filled)
                    }
                    None => return TypeId::ERROR,
                },
            };
            subst.insert(param.name, arg);
        }
        let instantiated = instantiate_type(self.interner, info.body, &subst);
        self.evaluate(instantiated)
    }

    /// Resolve a type to an object shape if it has one, following interface
    /// and alias references.
    pub(crate) fn object_shape_of(&self, ty: TypeId) -> Option<(ObjectShapeId, Arc<ObjectShape>)> {
        let mut current = ty;
        for _ in 0..MAX_EVALUATION_DEPTH {
            match self.interner.lookup(current)? {
                TypeData::Object(shape_id) | TypeData::ObjectWithIndex(shape_id) => {
                    return Some((shape_id, self.interner.object_shape(shape_id)));
                }
                TypeData::Lazy(def_id) => {
                    let info = self.defs.get(def_id)?;
                    if !info.type_params.is_empty() {
                        return None;
                    }
                    current = info.body;
                }
                _ => return None,
            }
        }
        None
    }

    /// Does `ty` contain a free type parameter or `infer` placeholder?
    /// Definition references are closed and never inspected.
    pub(crate) fn contains_type_parameters(&self, ty: TypeId) -> bool {
        let mut visited = rustc_hash::FxHashSet::default();
        self.contains_type_parameters_inner(ty, &mut visited)
    }

    fn contains_type_parameters_inner(
        &self,
        ty: TypeId,
        visited: &mut rustc_hash::FxHashSet<TypeId>,
    ) -> bool {
        if !visited.insert(ty) {
            return false;
        }
        let Some(data) = self.interner.lookup(ty) else {
            return false;
        };
        match data {
            TypeData::TypeParameter(_) | TypeData::Infer(_) => true,
            TypeData::Intrinsic(_)
            | TypeData::Literal(_)
            | TypeData::Lazy(_)
            | TypeData::Error => false,
            TypeData::Union(list_id) => self
                .interner
                .type_list(list_id)
                .iter()
                .any(|&member| self.contains_type_parameters_inner(member, visited)),
            TypeData::Object(shape_id) | TypeData::ObjectWithIndex(shape_id) => {
                let shape = self.interner.object_shape(shape_id);
                shape
                    .properties
                    .iter()
                    .any(|p| self.contains_type_parameters_inner(p.type_id, visited))
                    || shape.string_index.is_some_and(|index| {
                        self.contains_type_parameters_inner(index.value_type, visited)
                    })
                    || shape.number_index.is_some_and(|index| {
                        self.contains_type_parameters_inner(index.value_type, visited)
                    })
            }
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                shape
                    .params
                    .iter()
                    .any(|p| self.contains_type_parameters_inner(p.type_id, visited))
                    || self.contains_type_parameters_inner(shape.return_type, visited)
            }
            TypeData::Tuple(list_id) => self
                .interner
                .tuple_list(list_id)
                .iter()
                .any(|element| self.contains_type_parameters_inner(element.type_id, visited)),
            TypeData::KeyOf(operand) => self.contains_type_parameters_inner(operand, visited),
            TypeData::IndexAccess(object, index) => {
                self.contains_type_parameters_inner(object, visited)
                    || self.contains_type_parameters_inner(index, visited)
            }
            TypeData::Conditional(cond_id) => {
                let cond = self.interner.conditional_type(cond_id);
                self.contains_type_parameters_inner(cond.check_type, visited)
                    || self.contains_type_parameters_inner(cond.extends_type, visited)
                    || self.contains_type_parameters_inner(cond.true_type, visited)
                    || self.contains_type_parameters_inner(cond.false_type, visited)
            }
            TypeData::Mapped(mapped_id) => {
                let mapped = self.interner.mapped_type(mapped_id);
                // Only the key set decides whether a mapped type can expand;
                // the template always contains the (bound) iteration variable.
                self.contains_type_parameters_inner(mapped.constraint, visited)
            }
            TypeData::Application(app_id) => {
                let app = self.interner.type_application(app_id);
                self.contains_type_parameters_inner(app.base, visited)
                    || app
                        .args
                        .iter()
                        .any(|&arg| self.contains_type_parameters_inner(arg, visited))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/evaluate_tests.rs"]
mod evaluate_tests;
