//! The derived utility type catalog.
//!
//! Every operator here is an ordinary generic type alias whose body is
//! assembled from the primitive constructors: key enumeration (`keyof`),
//! mapped iteration, conditional branching, and `infer` extraction. None of
//! them is axiomatic; `Partial` really is `{ [P in Properties<T>]?: T[P] }`
//! over the registered `Properties` alias, and `Omit` is nothing but an
//! application of `Pick` to an application of `Exclude`.

use tracing::debug;

use crate::def::{DefId, DefinitionInfo, DefinitionStore};
use crate::intern::TypeInterner;
use crate::types::{
    ConditionalType, FunctionShape, MappedModifier, MappedType, ParamInfo, TypeId, TypeParamInfo,
};

/// Definition ids of the registered utility operators.
#[derive(Clone, Copy, Debug)]
pub struct Utilities {
    pub properties: DefId,
    pub partial: DefId,
    pub required: DefId,
    pub readonly: DefId,
    pub record: DefId,
    pub pick: DefId,
    pub exclude: DefId,
    pub extract: DefId,
    pub non_nullable: DefId,
    pub omit: DefId,
    pub parameters: DefId,
    pub return_type: DefId,
    pub values: DefId,
}

impl Utilities {
    /// Definition ids in registration order.
    pub fn iter(&self) -> impl Iterator<Item = DefId> {
        [
            self.properties,
            self.partial,
            self.required,
            self.readonly,
            self.record,
            self.pick,
            self.exclude,
            self.extract,
            self.non_nullable,
            self.omit,
            self.parameters,
            self.return_type,
            self.values,
        ]
        .into_iter()
    }
}

/// Register the utility operators, in dependency order, and return their
/// definition ids.
pub fn register_utilities(interner: &TypeInterner, defs: &DefinitionStore) -> Utilities {
    let properties = register_properties(interner, defs);
    let partial = register_partial(interner, defs, properties);
    let required = register_required(interner, defs, properties);
    let readonly = register_readonly(interner, defs, properties);
    let record = register_record(interner, defs);
    let pick = register_pick(interner, defs);
    let exclude = register_exclude(interner, defs);
    let extract = register_extract(interner, defs);
    let non_nullable = register_non_nullable(interner, defs);
    let omit = register_omit(interner, defs, pick, exclude);
    let parameters = register_parameters(interner, defs);
    let return_type = register_return_type(interner, defs);
    let values = register_values(interner, defs);
    debug!(definitions = defs.len(), "registered utility type operators");
    Utilities {
        properties,
        partial,
        required,
        readonly,
        record,
        pick,
        exclude,
        extract,
        non_nullable,
        omit,
        parameters,
        return_type,
        values,
    }
}

/// `type Properties<T> = keyof T;`
///
/// The key-enumeration primitive as a named operator; the mapped utilities
/// iterate over applications of it rather than over raw `keyof` nodes.
fn register_properties(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let t = interner.intern_string("T");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let body = interner.keyof(t_ref);
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Properties"),
        vec![TypeParamInfo::new(t)],
        body,
    ))
}

/// Shared body builder for the three homomorphic mapped utilities:
/// `{ [P in Properties<T>] <modifiers> : T[P] }`.
fn homomorphic_mapped(
    interner: &TypeInterner,
    properties: DefId,
    optional_modifier: Option<MappedModifier>,
    readonly_modifier: Option<MappedModifier>,
) -> (TypeParamInfo, TypeId) {
    let t = interner.intern_string("T");
    let p = interner.intern_string("P");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let p_ref = interner.type_parameter(TypeParamInfo::new(p));
    let keys = interner.application(interner.lazy(properties), vec![t_ref]);
    let body = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: keys,
        name_type: None,
        template: interner.index_access(t_ref, p_ref),
        optional_modifier,
        readonly_modifier,
    });
    (TypeParamInfo::new(t), body)
}

/// `type Partial<T> = { [P in Properties<T>]?: T[P] };`
fn register_partial(interner: &TypeInterner, defs: &DefinitionStore, properties: DefId) -> DefId {
    let (t, body) = homomorphic_mapped(interner, properties, Some(MappedModifier::Add), None);
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Partial"),
        vec![t],
        body,
    ))
}

/// `type Required<T> = { [P in Properties<T>]-?: T[P] };`
fn register_required(interner: &TypeInterner, defs: &DefinitionStore, properties: DefId) -> DefId {
    let (t, body) = homomorphic_mapped(interner, properties, Some(MappedModifier::Remove), None);
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Required"),
        vec![t],
        body,
    ))
}

/// `type Readonly<T> = { readonly [P in Properties<T>]: T[P] };`
fn register_readonly(interner: &TypeInterner, defs: &DefinitionStore, properties: DefId) -> DefId {
    let (t, body) = homomorphic_mapped(interner, properties, None, Some(MappedModifier::Add));
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Readonly"),
        vec![t],
        body,
    ))
}

/// `type Record<K extends string | number | symbol, V> = { [P in K]: V };`
///
/// The one intentionally non-homomorphic mapped utility: the template is
/// `V`, not an indexed access, so nothing is copied from a source shape.
fn register_record(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let k = interner.intern_string("K");
    let v = interner.intern_string("V");
    let p = interner.intern_string("P");
    let key_set = interner.union3(TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL);
    let k_ref = interner.type_parameter(TypeParamInfo::with_constraint(k, key_set));
    let v_ref = interner.type_parameter(TypeParamInfo::new(v));
    let body = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: k_ref,
        name_type: None,
        template: v_ref,
        optional_modifier: None,
        readonly_modifier: None,
    });
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Record"),
        vec![
            TypeParamInfo::with_constraint(k, key_set),
            TypeParamInfo::new(v),
        ],
        body,
    ))
}

/// `type Pick<T, K extends keyof T> = { [P in K]: T[P] };`
fn register_pick(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let t = interner.intern_string("T");
    let k = interner.intern_string("K");
    let p = interner.intern_string("P");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let keys_of_t = interner.keyof(t_ref);
    let k_ref = interner.type_parameter(TypeParamInfo::with_constraint(k, keys_of_t));
    let p_ref = interner.type_parameter(TypeParamInfo::new(p));
    let body = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: k_ref,
        name_type: None,
        template: interner.index_access(t_ref, p_ref),
        optional_modifier: None,
        readonly_modifier: None,
    });
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Pick"),
        vec![
            TypeParamInfo::new(t),
            TypeParamInfo::with_constraint(k, keys_of_t),
        ],
        body,
    ))
}

/// `type Exclude<T, U> = T extends U ? never : T;`
fn register_exclude(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let t = interner.intern_string("T");
    let u = interner.intern_string("U");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let u_ref = interner.type_parameter(TypeParamInfo::new(u));
    let body = interner.conditional(ConditionalType {
        check_type: t_ref,
        extends_type: u_ref,
        true_type: TypeId::NEVER,
        false_type: t_ref,
        is_distributive: true,
    });
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Exclude"),
        vec![TypeParamInfo::new(t), TypeParamInfo::new(u)],
        body,
    ))
}

/// `type Extract<T, U> = T extends U ? T : never;`
fn register_extract(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let t = interner.intern_string("T");
    let u = interner.intern_string("U");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let u_ref = interner.type_parameter(TypeParamInfo::new(u));
    let body = interner.conditional(ConditionalType {
        check_type: t_ref,
        extends_type: u_ref,
        true_type: t_ref,
        false_type: TypeId::NEVER,
        is_distributive: true,
    });
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Extract"),
        vec![TypeParamInfo::new(t), TypeParamInfo::new(u)],
        body,
    ))
}

/// `type NonNullable<T> = T extends null | undefined ? never : T;`
fn register_non_nullable(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let t = interner.intern_string("T");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let nullish = interner.union2(TypeId::NULL, TypeId::UNDEFINED);
    let body = interner.conditional(ConditionalType {
        check_type: t_ref,
        extends_type: nullish,
        true_type: TypeId::NEVER,
        false_type: t_ref,
        is_distributive: true,
    });
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("NonNullable"),
        vec![TypeParamInfo::new(t)],
        body,
    ))
}

/// `type Omit<T, K extends keyof T> = Pick<T, Exclude<keyof T, K>>;`
///
/// Purely compositional: the body is two applications and a `keyof`, so the
/// whole pipeline exercises application evaluation, distribution, and the
/// mapped rule in one go.
fn register_omit(
    interner: &TypeInterner,
    defs: &DefinitionStore,
    pick: DefId,
    exclude: DefId,
) -> DefId {
    let t = interner.intern_string("T");
    let k = interner.intern_string("K");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let keys_of_t = interner.keyof(t_ref);
    let k_ref = interner.type_parameter(TypeParamInfo::with_constraint(k, keys_of_t));
    let kept = interner.application(interner.lazy(exclude), vec![keys_of_t, k_ref]);
    let body = interner.application(interner.lazy(pick), vec![t_ref, kept]);
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Omit"),
        vec![
            TypeParamInfo::new(t),
            TypeParamInfo::with_constraint(k, keys_of_t),
        ],
        body,
    ))
}

/// The `(...args: any) => any` constraint shared by the two signature
/// utilities.
fn any_function(interner: &TypeInterner) -> TypeId {
    let args = interner.intern_string("args");
    interner.function(FunctionShape {
        params: vec![ParamInfo::rest(args, TypeId::ANY)],
        return_type: TypeId::ANY,
    })
}

/// `type Parameters<T extends (...args: any) => any> =
///     T extends (...args: infer R) => any ? R : T;`
///
/// The false branch is `T`, not `never`: on the constraint boundary the
/// operator is total and passes unmatched input through.
fn register_parameters(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let t = interner.intern_string("T");
    let r = interner.intern_string("R");
    let args = interner.intern_string("args");
    let callable = any_function(interner);
    let t_ref = interner.type_parameter(TypeParamInfo::with_constraint(t, callable));
    let infer_r = interner.infer(TypeParamInfo::new(r));
    let pattern = interner.function(FunctionShape {
        params: vec![ParamInfo {
            name: Some(args),
            type_id: infer_r,
            optional: false,
            rest: true,
        }],
        return_type: TypeId::ANY,
    });
    let body = interner.conditional(ConditionalType {
        check_type: t_ref,
        extends_type: pattern,
        true_type: infer_r,
        false_type: t_ref,
        is_distributive: true,
    });
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Parameters"),
        vec![TypeParamInfo::with_constraint(t, callable)],
        body,
    ))
}

/// `type ReturnType<T extends (...args: any) => any> =
///     T extends (...args: any) => infer R ? R : T;`
fn register_return_type(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let t = interner.intern_string("T");
    let r = interner.intern_string("R");
    let args = interner.intern_string("args");
    let callable = any_function(interner);
    let t_ref = interner.type_parameter(TypeParamInfo::with_constraint(t, callable));
    let infer_r = interner.infer(TypeParamInfo::new(r));
    let pattern = interner.function(FunctionShape {
        params: vec![ParamInfo::rest(args, TypeId::ANY)],
        return_type: infer_r,
    });
    let body = interner.conditional(ConditionalType {
        check_type: t_ref,
        extends_type: pattern,
        true_type: infer_r,
        false_type: t_ref,
        is_distributive: true,
    });
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("ReturnType"),
        vec![TypeParamInfo::with_constraint(t, callable)],
        body,
    ))
}

/// `type Values<T> = T[keyof T];`
fn register_values(interner: &TypeInterner, defs: &DefinitionStore) -> DefId {
    let t = interner.intern_string("T");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let body = interner.index_access(t_ref, interner.keyof(t_ref));
    defs.register(DefinitionInfo::type_alias(
        interner.intern_string("Values"),
        vec![TypeParamInfo::new(t)],
        body,
    ))
}

#[cfg(test)]
#[path = "../tests/utilities_tests.rs"]
mod utilities_tests;
