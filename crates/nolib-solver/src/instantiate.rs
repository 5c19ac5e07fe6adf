//! Type instantiation: substituting type arguments for type parameters.
//!
//! Instantiation rebuilds a type bottom-up through the interner, so the
//! result is canonical. It does not evaluate: operator forms (`keyof`,
//! indexed access, conditionals, mapped types) are rebuilt with substituted
//! operands and left for the evaluator.
//!
//! The one place instantiation is more than a structural walk is
//! distributive conditionals. `T extends U ? X : Y` with a naked check
//! parameter `T` distributes when `T` is bound to a union: the conditional
//! is instantiated once per member, with `T` bound to that member in the
//! branches as well. This is what makes `Exclude<"a" | "b", "a">` resolve
//! member-wise rather than comparing the whole union at once.

use crate::intern::TypeInterner;
use crate::types::{
    ConditionalType, FunctionShape, MappedType, ParamInfo, PropertyInfo, TupleElement, TypeData,
    TypeId, TypeParamInfo,
};
use nolib_common::interner::Atom;
use nolib_common::limits::MAX_DISTRIBUTION_SIZE;
use rustc_hash::FxHashMap;

/// A mapping from type-parameter names to argument types.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<Atom, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        TypeSubstitution {
            map: FxHashMap::default(),
        }
    }

    /// Zip parameters with arguments. Missing trailing arguments are left
    /// unbound; the caller fills defaults first.
    pub fn from_args(params: &[TypeParamInfo], args: &[TypeId]) -> Self {
        let mut subst = TypeSubstitution::new();
        for (param, &arg) in params.iter().zip(args) {
            subst.insert(param.name, arg);
        }
        subst
    }

    pub fn insert(&mut self, name: Atom, ty: TypeId) {
        self.map.insert(name, ty);
    }

    pub fn get(&self, name: Atom) -> Option<TypeId> {
        self.map.get(&name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Copy of this substitution with one binding removed. Used to shadow a
    /// mapped type's iteration variable inside its template.
    pub fn without(&self, name: Atom) -> Self {
        let mut map = self.map.clone();
        map.remove(&name);
        TypeSubstitution { map }
    }

    /// Copy of this substitution with one binding added or replaced.
    pub fn with(&self, name: Atom, ty: TypeId) -> Self {
        let mut map = self.map.clone();
        map.insert(name, ty);
        TypeSubstitution { map }
    }
}

/// Substitute bound parameters throughout `ty`, rebuilding through the
/// interner.
pub fn instantiate_type(interner: &TypeInterner, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return ty;
    }
    let Some(data) = interner.lookup(ty) else {
        return TypeId::ERROR;
    };
    match data {
        TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::Lazy(_) | TypeData::Error => ty,
        TypeData::TypeParameter(info) | TypeData::Infer(info) => {
            subst.get(info.name).unwrap_or(ty)
        }
        TypeData::Union(list_id) => {
            let members = interner
                .type_list(list_id)
                .iter()
                .map(|&member| instantiate_type(interner, member, subst))
                .collect();
            interner.union(members)
        }
        TypeData::Object(shape_id) => {
            let shape = interner.object_shape(shape_id);
            interner.object(instantiate_properties(interner, &shape.properties, subst))
        }
        TypeData::ObjectWithIndex(shape_id) => {
            let shape = interner.object_shape(shape_id);
            let properties = instantiate_properties(interner, &shape.properties, subst);
            let string_index = shape.string_index.map(|index| {
                crate::types::IndexSignature {
                    key_type: instantiate_type(interner, index.key_type, subst),
                    value_type: instantiate_type(interner, index.value_type, subst),
                    readonly: index.readonly,
                }
            });
            let number_index = shape.number_index.map(|index| {
                crate::types::IndexSignature {
                    key_type: instantiate_type(interner, index.key_type, subst),
                    value_type: instantiate_type(interner, index.value_type, subst),
                    readonly: index.readonly,
                }
            });
            interner.object_with_index(properties, string_index, number_index)
        }
        TypeData::Function(shape_id) => {
            let shape = interner.function_shape(shape_id);
            let params = shape
                .params
                .iter()
                .map(|param| ParamInfo {
                    name: param.name,
                    type_id: instantiate_type(interner, param.type_id, subst),
                    optional: param.optional,
                    rest: param.rest,
                })
                .collect();
            let return_type = instantiate_type(interner, shape.return_type, subst);
            interner.function(FunctionShape {
                params,
                return_type,
            })
        }
        TypeData::Tuple(list_id) => {
            let elements = interner
                .tuple_list(list_id)
                .iter()
                .map(|element| TupleElement {
                    type_id: instantiate_type(interner, element.type_id, subst),
                    name: element.name,
                    optional: element.optional,
                    rest: element.rest,
                })
                .collect();
            interner.tuple(elements)
        }
        TypeData::KeyOf(operand) => {
            interner.keyof(instantiate_type(interner, operand, subst))
        }
        TypeData::IndexAccess(object, index) => {
            let object = instantiate_type(interner, object, subst);
            let index = instantiate_type(interner, index, subst);
            interner.index_access(object, index)
        }
        TypeData::Conditional(cond_id) => {
            let cond = interner.conditional_type(cond_id);
            instantiate_conditional(interner, &cond, subst)
        }
        TypeData::Mapped(mapped_id) => {
            let mapped = interner.mapped_type(mapped_id);
            // The iteration variable is bound per key during evaluation, so
            // it shadows any same-named outer parameter here.
            let inner = subst.without(mapped.type_param.name);
            let type_param = TypeParamInfo {
                name: mapped.type_param.name,
                constraint: mapped
                    .type_param
                    .constraint
                    .map(|c| instantiate_type(interner, c, subst)),
                default: mapped
                    .type_param
                    .default
                    .map(|d| instantiate_type(interner, d, subst)),
            };
            interner.mapped(MappedType {
                type_param,
                constraint: instantiate_type(interner, mapped.constraint, subst),
                name_type: mapped
                    .name_type
                    .map(|name_type| instantiate_type(interner, name_type, &inner)),
                template: instantiate_type(interner, mapped.template, &inner),
                optional_modifier: mapped.optional_modifier,
                readonly_modifier: mapped.readonly_modifier,
            })
        }
        TypeData::Application(app_id) => {
            let app = interner.type_application(app_id);
            let base = instantiate_type(interner, app.base, subst);
            let args = app
                .args
                .iter()
                .map(|&arg| instantiate_type(interner, arg, subst))
                .collect();
            interner.application(base, args)
        }
    }
}

fn instantiate_properties(
    interner: &TypeInterner,
    properties: &[PropertyInfo],
    subst: &TypeSubstitution,
) -> Vec<PropertyInfo> {
    properties
        .iter()
        .map(|property| PropertyInfo {
            name: property.name,
            type_id: instantiate_type(interner, property.type_id, subst),
            optional: property.optional,
            readonly: property.readonly,
        })
        .collect()
}

fn instantiate_conditional(
    interner: &TypeInterner,
    cond: &ConditionalType,
    subst: &TypeSubstitution,
) -> TypeId {
    if cond.is_distributive
        && let Some(TypeData::TypeParameter(param)) = interner.lookup(cond.check_type)
        && let Some(bound) = subst.get(param.name)
    {
        // Distribution over the bound union happens here, before evaluation,
        // so the branches see the individual member.
        if bound == TypeId::NEVER {
            return TypeId::NEVER;
        }
        if let Some(TypeData::Union(list_id)) = interner.lookup(bound) {
            let members = interner.type_list(list_id);
            if members.len() > MAX_DISTRIBUTION_SIZE {
                return TypeId::ERROR;
            }
            let arms = members
                .iter()
                .map(|&member| {
                    let narrowed = subst.with(param.name, member);
                    instantiate_conditional(interner, cond, &narrowed)
                })
                .collect();
            return interner.union(arms);
        }
    }
    interner.conditional(ConditionalType {
        check_type: instantiate_type(interner, cond.check_type, subst),
        extends_type: instantiate_type(interner, cond.extends_type, subst),
        true_type: instantiate_type(interner, cond.true_type, subst),
        false_type: instantiate_type(interner, cond.false_type, subst),
        is_distributive: cond.is_distributive,
    })
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod instantiate_tests;
