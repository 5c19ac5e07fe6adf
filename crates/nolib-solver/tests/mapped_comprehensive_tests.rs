//! Comprehensive mapped-type evaluation tests:
//! `{ [P in K as N]: T }` with `?` and `readonly` modifiers.

use super::*;

fn setup() -> (TypeInterner, DefinitionStore) {
    (TypeInterner::new(), DefinitionStore::new())
}

/// `{ [P in keyof <source>] <modifiers>: <source>[P] }`
fn homomorphic(
    interner: &TypeInterner,
    source: TypeId,
    optional: Option<MappedModifier>,
    readonly: Option<MappedModifier>,
) -> TypeId {
    let p = interner.intern_string("P");
    let p_ref = interner.type_parameter(TypeParamInfo::new(p));
    interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: interner.keyof(source),
        name_type: None,
        template: interner.index_access(source, p_ref),
        optional_modifier: optional,
        readonly_modifier: readonly,
    })
}

// ===== Homomorphic modifier application =====

#[test]
fn test_add_optional_modifier() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let source = interner.object(vec![
        PropertyInfo::new(a, TypeId::STRING),
        PropertyInfo::new(b, TypeId::NUMBER),
    ]);

    let mapped = homomorphic(&interner, source, Some(MappedModifier::Add), None);
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object(vec![
            PropertyInfo::opt(a, TypeId::STRING),
            PropertyInfo::opt(b, TypeId::NUMBER),
        ])
    );
}

#[test]
fn test_remove_optional_modifier_strips_undefined() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let source = interner.object(vec![
        PropertyInfo::opt(a, interner.union2(TypeId::STRING, TypeId::UNDEFINED)),
        PropertyInfo::opt(b, TypeId::NUMBER),
    ]);

    let mapped = homomorphic(&interner, source, Some(MappedModifier::Remove), None);
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object(vec![
            PropertyInfo::new(a, TypeId::STRING),
            PropertyInfo::new(b, TypeId::NUMBER),
        ])
    );
}

#[test]
fn test_add_readonly_modifier() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let source = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);

    let mapped = homomorphic(&interner, source, None, Some(MappedModifier::Add));
    let result = evaluate_type(&interner, &defs, mapped);
    assert_eq!(
        result,
        interner.object(vec![PropertyInfo {
            name: a,
            type_id: TypeId::STRING,
            optional: false,
            readonly: true,
        }])
    );

    let Some(TypeData::Object(shape_id)) = interner.lookup(result) else {
        panic!("expected an object, got {result:?}");
    };
    let shape = interner.object_shape(shape_id);
    assert!(shape.flags.contains(ObjectFlags::ALL_READONLY));
}

#[test]
fn test_remove_readonly_modifier() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let source = interner.object(vec![PropertyInfo {
        name: a,
        type_id: TypeId::STRING,
        optional: false,
        readonly: true,
    }]);

    let mapped = homomorphic(&interner, source, None, Some(MappedModifier::Remove));
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object(vec![PropertyInfo::new(a, TypeId::STRING)])
    );
}

#[test]
fn test_homomorphic_copy_preserves_unmentioned_flags() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let source = interner.object(vec![
        PropertyInfo {
            name: a,
            type_id: TypeId::STRING,
            optional: false,
            readonly: true,
        },
        PropertyInfo::opt(b, TypeId::NUMBER),
    ]);

    // Adding `?` leaves the readonly flags exactly as declared.
    let mapped = homomorphic(&interner, source, Some(MappedModifier::Add), None);
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object(vec![
            PropertyInfo {
                name: a,
                type_id: TypeId::STRING,
                optional: true,
                readonly: true,
            },
            PropertyInfo::opt(b, TypeId::NUMBER),
        ])
    );
}

// ===== Identity fast paths =====

#[test]
fn test_identity_mapping_returns_source_reference() {
    let (interner, defs) = setup();
    let fruit = interner.intern_string("Fruit");
    let name = interner.intern_string("name");
    let body = interner.object(vec![PropertyInfo::new(name, TypeId::STRING)]);
    let def_id = defs.register(DefinitionInfo::interface(fruit, vec![], body));
    let lazy = interner.lazy(def_id);

    // `{ [P in keyof Fruit]: Fruit[P] }` is Fruit itself, reference intact.
    let mapped = homomorphic(&interner, lazy, None, None);
    assert_eq!(evaluate_type(&interner, &defs, mapped), lazy);
}

#[test]
fn test_add_optional_over_all_optional_source_is_identity() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let source = interner.object(vec![PropertyInfo::opt(a, TypeId::STRING)]);

    let mapped = homomorphic(&interner, source, Some(MappedModifier::Add), None);
    assert_eq!(evaluate_type(&interner, &defs, mapped), source);
}

#[test]
fn test_remove_optional_over_all_required_source_is_identity() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let source = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);

    let mapped = homomorphic(&interner, source, Some(MappedModifier::Remove), None);
    assert_eq!(evaluate_type(&interner, &defs, mapped), source);
}

#[test]
fn test_identity_holds_for_index_signature_shapes() {
    let (interner, defs) = setup();
    let map = interner.object_with_index(
        vec![],
        Some(IndexSignature {
            key_type: TypeId::STRING,
            value_type: TypeId::NUMBER,
            readonly: false,
        }),
        None,
    );

    let mapped = homomorphic(&interner, map, None, None);
    assert_eq!(evaluate_type(&interner, &defs, mapped), map);
}

// ===== Non-homomorphic mappings =====

#[test]
fn test_constant_template_over_literal_keys() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let p = interner.intern_string("P");
    let keys = interner.union2(interner.literal_string("a"), interner.literal_string("b"));

    // { [P in "a" | "b"]: number }
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: keys,
        name_type: None,
        template: TypeId::NUMBER,
        optional_modifier: None,
        readonly_modifier: None,
    });
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object(vec![
            PropertyInfo::new(a, TypeId::NUMBER),
            PropertyInfo::new(b, TypeId::NUMBER),
        ])
    );
}

#[test]
fn test_template_sees_the_iteration_variable() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    let p = interner.intern_string("P");
    let p_ref = interner.type_parameter(TypeParamInfo::new(p));
    let keys = interner.union2(interner.literal_string("a"), interner.literal_string("b"));

    // { [P in "a" | "b"]: P } maps every key to its own literal.
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: keys,
        name_type: None,
        template: p_ref,
        optional_modifier: None,
        readonly_modifier: None,
    });
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object(vec![
            PropertyInfo::new(a, interner.literal_string("a")),
            PropertyInfo::new(b, interner.literal_string("b")),
        ])
    );
}

#[test]
fn test_number_literal_keys_become_numeric_property_names() {
    let (interner, defs) = setup();
    let zero = interner.intern_string("0");
    let p = interner.intern_string("P");

    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: interner.literal_number(0.0),
        name_type: None,
        template: TypeId::BOOLEAN,
        optional_modifier: None,
        readonly_modifier: None,
    });
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object(vec![PropertyInfo::new(zero, TypeId::BOOLEAN)])
    );
}

// ===== Index-signature key sets =====

#[test]
fn test_string_key_produces_string_index() {
    let (interner, defs) = setup();
    let p = interner.intern_string("P");

    // { [P in string]: number }
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: TypeId::STRING,
        name_type: None,
        template: TypeId::NUMBER,
        optional_modifier: None,
        readonly_modifier: None,
    });
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object_with_index(
            vec![],
            Some(IndexSignature {
                key_type: TypeId::STRING,
                value_type: TypeId::NUMBER,
                readonly: false,
            }),
            None,
        )
    );
}

#[test]
fn test_optional_modifier_moves_into_index_value() {
    let (interner, defs) = setup();
    let map = interner.object_with_index(
        vec![],
        Some(IndexSignature {
            key_type: TypeId::STRING,
            value_type: TypeId::NUMBER,
            readonly: false,
        }),
        None,
    );

    // keyof of a string-indexed shape is string | number, so the mapping
    // rebuilds both signatures with `undefined` folded into the values.
    let mapped = homomorphic(&interner, map, Some(MappedModifier::Add), None);
    let loose = interner.union2(TypeId::NUMBER, TypeId::UNDEFINED);
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object_with_index(
            vec![],
            Some(IndexSignature {
                key_type: TypeId::STRING,
                value_type: loose,
                readonly: false,
            }),
            Some(IndexSignature {
                key_type: TypeId::NUMBER,
                value_type: loose,
                readonly: false,
            }),
        )
    );
}

#[test]
fn test_mixed_literal_and_number_keys() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let p = interner.intern_string("P");
    let keys = interner.union2(interner.literal_string("a"), TypeId::NUMBER);

    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: keys,
        name_type: None,
        template: TypeId::BOOLEAN,
        optional_modifier: None,
        readonly_modifier: None,
    });
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object_with_index(
            vec![PropertyInfo::new(a, TypeId::BOOLEAN)],
            None,
            Some(IndexSignature {
                key_type: TypeId::NUMBER,
                value_type: TypeId::BOOLEAN,
                readonly: false,
            }),
        )
    );
}

#[test]
fn test_symbol_and_never_keys_produce_empty_object() {
    let (interner, defs) = setup();
    let p = interner.intern_string("P");
    let empty = interner.object(vec![]);

    for constraint in [TypeId::SYMBOL, TypeId::NEVER] {
        let mapped = interner.mapped(MappedType {
            type_param: TypeParamInfo::new(p),
            constraint,
            name_type: None,
            template: TypeId::NUMBER,
            optional_modifier: None,
            readonly_modifier: None,
        });
        assert_eq!(evaluate_type(&interner, &defs, mapped), empty);
    }
}

// ===== Key remapping =====

#[test]
fn test_as_clause_renames_keys() {
    let (interner, defs) = setup();
    let b = interner.intern_string("b");
    let x = interner.intern_string("x");
    let p = interner.intern_string("P");
    let p_ref = interner.type_parameter(TypeParamInfo::new(p));
    let lit_a = interner.literal_string("a");
    let keys = interner.union2(lit_a, interner.literal_string("b"));

    // { [P in "a" | "b" as P extends "a" ? "x" : P]: number }
    let rename = interner.conditional(ConditionalType {
        check_type: p_ref,
        extends_type: lit_a,
        true_type: interner.literal_string("x"),
        false_type: p_ref,
        is_distributive: true,
    });
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: keys,
        name_type: Some(rename),
        template: TypeId::NUMBER,
        optional_modifier: None,
        readonly_modifier: None,
    });
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object(vec![
            PropertyInfo::new(b, TypeId::NUMBER),
            PropertyInfo::new(x, TypeId::NUMBER),
        ])
    );
}

#[test]
fn test_as_clause_never_drops_key() {
    let (interner, defs) = setup();
    let b = interner.intern_string("b");
    let p = interner.intern_string("P");
    let p_ref = interner.type_parameter(TypeParamInfo::new(p));
    let lit_a = interner.literal_string("a");
    let keys = interner.union2(lit_a, interner.literal_string("b"));

    // { [P in "a" | "b" as P extends "a" ? never : P]: number }
    let filter = interner.conditional(ConditionalType {
        check_type: p_ref,
        extends_type: lit_a,
        true_type: TypeId::NEVER,
        false_type: p_ref,
        is_distributive: true,
    });
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: keys,
        name_type: Some(filter),
        template: TypeId::NUMBER,
        optional_modifier: None,
        readonly_modifier: None,
    });
    assert_eq!(
        evaluate_type(&interner, &defs, mapped),
        interner.object(vec![PropertyInfo::new(b, TypeId::NUMBER)])
    );
}

#[test]
fn test_as_clause_non_key_result_poisons() {
    let (interner, defs) = setup();
    let p = interner.intern_string("P");

    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: interner.literal_string("a"),
        name_type: Some(TypeId::BOOLEAN),
        template: TypeId::NUMBER,
        optional_modifier: None,
        readonly_modifier: None,
    });
    assert_eq!(evaluate_type(&interner, &defs, mapped), TypeId::ERROR);
}

// ===== Deferral =====

#[test]
fn test_unresolved_constraint_defers_whole_mapped_type() {
    let (interner, defs) = setup();
    let t = interner.intern_string("T");
    let p = interner.intern_string("P");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let p_ref = interner.type_parameter(TypeParamInfo::new(p));

    // { [P in keyof T]: T[P] } with T still free.
    let mapped = interner.mapped(MappedType {
        type_param: TypeParamInfo::new(p),
        constraint: interner.keyof(t_ref),
        name_type: None,
        template: interner.index_access(t_ref, p_ref),
        optional_modifier: None,
        readonly_modifier: None,
    });
    assert_eq!(evaluate_type(&interner, &defs, mapped), mapped);
}
