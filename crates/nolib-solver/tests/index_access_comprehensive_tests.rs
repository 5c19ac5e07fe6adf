//! Comprehensive indexed-access evaluation tests: `T[K]`.

use super::*;

fn setup() -> (TypeInterner, DefinitionStore) {
    (TypeInterner::new(), DefinitionStore::new())
}

fn access(
    interner: &TypeInterner,
    defs: &DefinitionStore,
    object: TypeId,
    index: TypeId,
) -> TypeId {
    evaluate_type(interner, defs, interner.index_access(object, index))
}

// ===== Property reads =====

#[test]
fn test_property_read_by_string_literal() {
    let (interner, defs) = setup();
    let name = interner.intern_string("name");
    let sweetness = interner.intern_string("sweetness");
    let fruit = interner.object(vec![
        PropertyInfo::new(name, TypeId::STRING),
        PropertyInfo::new(sweetness, TypeId::NUMBER),
    ]);

    let key = interner.literal_string("sweetness");
    assert_eq!(access(&interner, &defs, fruit, key), TypeId::NUMBER);
}

#[test]
fn test_optional_property_reads_with_undefined() {
    let (interner, defs) = setup();
    let color = interner.intern_string("color");
    let object = interner.object(vec![PropertyInfo::opt(color, TypeId::STRING)]);

    let key = interner.literal_string("color");
    assert_eq!(
        access(&interner, &defs, object, key),
        interner.union2(TypeId::STRING, TypeId::UNDEFINED)
    );
}

#[test]
fn test_missing_property_is_error() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let object = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);

    let key = interner.literal_string("missing");
    assert_eq!(access(&interner, &defs, object, key), TypeId::ERROR);
}

#[test]
fn test_number_literal_key_reads_numeric_property_name() {
    let (interner, defs) = setup();
    let one = interner.intern_string("1");
    let object = interner.object(vec![PropertyInfo::new(one, TypeId::BOOLEAN)]);

    let key = interner.literal_number(1.0);
    assert_eq!(access(&interner, &defs, object, key), TypeId::BOOLEAN);
}

#[test]
fn test_interface_reference_resolves_to_shape() {
    let (interner, defs) = setup();
    let fruit = interner.intern_string("Fruit");
    let name = interner.intern_string("name");
    let body = interner.object(vec![PropertyInfo::new(name, TypeId::STRING)]);
    let def_id = defs.register(DefinitionInfo::interface(fruit, vec![], body));

    let key = interner.literal_string("name");
    assert_eq!(
        access(&interner, &defs, interner.lazy(def_id), key),
        TypeId::STRING
    );
}

// ===== Index signatures =====

fn string_map(interner: &TypeInterner, value: TypeId) -> TypeId {
    interner.object_with_index(
        vec![],
        Some(IndexSignature {
            key_type: TypeId::STRING,
            value_type: value,
            readonly: false,
        }),
        None,
    )
}

fn number_map(interner: &TypeInterner, value: TypeId) -> TypeId {
    interner.object_with_index(
        vec![],
        None,
        Some(IndexSignature {
            key_type: TypeId::NUMBER,
            value_type: value,
            readonly: false,
        }),
    )
}

#[test]
fn test_string_index_serves_unknown_literal_keys() {
    let (interner, defs) = setup();
    let map = string_map(&interner, TypeId::NUMBER);
    let key = interner.literal_string("anything");
    assert_eq!(access(&interner, &defs, map, key), TypeId::NUMBER);
}

#[test]
fn test_numeric_string_key_prefers_number_index() {
    let (interner, defs) = setup();
    let map = number_map(&interner, TypeId::BOOLEAN);

    let numeric = interner.literal_string("0");
    assert_eq!(access(&interner, &defs, map, numeric), TypeId::BOOLEAN);

    // A non-numeric key has no signature to fall back on.
    let alpha = interner.literal_string("a");
    assert_eq!(access(&interner, &defs, map, alpha), TypeId::ERROR);
}

#[test]
fn test_intrinsic_keys_select_signatures() {
    let (interner, defs) = setup();
    let strings = string_map(&interner, TypeId::NUMBER);
    let numbers = number_map(&interner, TypeId::BOOLEAN);

    assert_eq!(
        access(&interner, &defs, strings, TypeId::STRING),
        TypeId::NUMBER
    );
    // A number key falls back to the string signature.
    assert_eq!(
        access(&interner, &defs, strings, TypeId::NUMBER),
        TypeId::NUMBER
    );
    // The reverse fallback does not exist.
    assert_eq!(
        access(&interner, &defs, numbers, TypeId::STRING),
        TypeId::ERROR
    );
    assert_eq!(
        access(&interner, &defs, numbers, TypeId::NUMBER),
        TypeId::BOOLEAN
    );
}

// ===== Tuples =====

#[test]
fn test_tuple_access_by_position() {
    let (interner, defs) = setup();
    let pair = interner.tuple(vec![
        TupleElement::new(TypeId::STRING),
        TupleElement::new(TypeId::NUMBER),
    ]);

    assert_eq!(
        access(&interner, &defs, pair, interner.literal_number(0.0)),
        TypeId::STRING
    );
    assert_eq!(
        access(&interner, &defs, pair, interner.literal_number(1.0)),
        TypeId::NUMBER
    );
    // Indices spell as strings too.
    assert_eq!(
        access(&interner, &defs, pair, interner.literal_string("1")),
        TypeId::NUMBER
    );
}

#[test]
fn test_tuple_access_rejects_bad_indices() {
    let (interner, defs) = setup();
    let pair = interner.tuple(vec![
        TupleElement::new(TypeId::STRING),
        TupleElement::new(TypeId::NUMBER),
    ]);

    for key in [
        interner.literal_number(2.0),
        interner.literal_number(0.5),
        interner.literal_number(-1.0),
        interner.literal_string("01"),
        interner.literal_string("length"),
    ] {
        assert_eq!(access(&interner, &defs, pair, key), TypeId::ERROR);
    }
}

#[test]
fn test_tuple_optional_element_reads_with_undefined() {
    let (interner, defs) = setup();
    let tuple = interner.tuple(vec![
        TupleElement::new(TypeId::STRING),
        TupleElement {
            type_id: TypeId::NUMBER,
            name: None,
            optional: true,
            rest: false,
        },
    ]);

    assert_eq!(
        access(&interner, &defs, tuple, interner.literal_number(1.0)),
        interner.union2(TypeId::NUMBER, TypeId::UNDEFINED)
    );
}

#[test]
fn test_tuple_rest_covers_remaining_positions() {
    let (interner, defs) = setup();
    let open = interner.tuple(vec![
        TupleElement::new(TypeId::STRING),
        TupleElement {
            type_id: TypeId::NUMBER,
            name: None,
            optional: false,
            rest: true,
        },
    ]);

    assert_eq!(
        access(&interner, &defs, open, interner.literal_number(1.0)),
        TypeId::NUMBER
    );
    assert_eq!(
        access(&interner, &defs, open, interner.literal_number(57.0)),
        TypeId::NUMBER
    );
}

#[test]
fn test_tuple_number_key_unions_all_elements() {
    let (interner, defs) = setup();
    let pair = interner.tuple(vec![
        TupleElement::new(TypeId::STRING),
        TupleElement::new(TypeId::NUMBER),
    ]);
    assert_eq!(
        access(&interner, &defs, pair, TypeId::NUMBER),
        interner.union2(TypeId::STRING, TypeId::NUMBER)
    );

    let with_optional = interner.tuple(vec![
        TupleElement::new(TypeId::STRING),
        TupleElement {
            type_id: TypeId::NUMBER,
            name: None,
            optional: true,
            rest: false,
        },
    ]);
    assert_eq!(
        access(&interner, &defs, with_optional, TypeId::NUMBER),
        interner.union3(TypeId::STRING, TypeId::NUMBER, TypeId::UNDEFINED)
    );
}

// ===== Distribution =====

#[test]
fn test_access_distributes_over_union_index() {
    let (interner, defs) = setup();
    let name = interner.intern_string("name");
    let sweetness = interner.intern_string("sweetness");
    let fruit = interner.object(vec![
        PropertyInfo::new(name, TypeId::STRING),
        PropertyInfo::new(sweetness, TypeId::NUMBER),
    ]);

    let keys = interner.union2(
        interner.literal_string("name"),
        interner.literal_string("sweetness"),
    );
    assert_eq!(
        access(&interner, &defs, fruit, keys),
        interner.union2(TypeId::STRING, TypeId::NUMBER)
    );
}

#[test]
fn test_access_distributes_over_union_object() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");

    let left = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);
    let right = interner.object(vec![PropertyInfo::new(a, TypeId::NUMBER)]);
    let key = interner.literal_string("a");

    assert_eq!(
        access(&interner, &defs, interner.union2(left, right), key),
        interner.union2(TypeId::STRING, TypeId::NUMBER)
    );
}

#[test]
fn test_union_member_missing_key_poisons_access() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");

    let left = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);
    let right = interner.object(vec![PropertyInfo::new(b, TypeId::NUMBER)]);
    let key = interner.literal_string("a");

    assert_eq!(
        access(&interner, &defs, interner.union2(left, right), key),
        TypeId::ERROR
    );
}

// ===== Special operands =====

#[test]
fn test_special_operands() {
    let (interner, defs) = setup();
    let a = interner.intern_string("a");
    let object = interner.object(vec![PropertyInfo::new(a, TypeId::STRING)]);
    let key = interner.literal_string("a");

    // any[K] = any
    assert_eq!(access(&interner, &defs, TypeId::ANY, key), TypeId::ANY);
    // T[never] = never
    assert_eq!(access(&interner, &defs, object, TypeId::NEVER), TypeId::NEVER);
    // The error type poisons from either side.
    assert_eq!(access(&interner, &defs, TypeId::ERROR, key), TypeId::ERROR);
    assert_eq!(access(&interner, &defs, object, TypeId::ERROR), TypeId::ERROR);
    // Primitives have nothing to index.
    assert_eq!(access(&interner, &defs, TypeId::STRING, key), TypeId::ERROR);
}

#[test]
fn test_access_with_free_parameters_defers() {
    let (interner, defs) = setup();
    let t = interner.intern_string("T");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let key = interner.literal_string("a");

    let deferred = interner.index_access(t_ref, key);
    assert_eq!(evaluate_type(&interner, &defs, deferred), deferred);

    // A parameter buried in the object defers the whole access.
    let x = interner.intern_string("x");
    let open_object = interner.object(vec![PropertyInfo::new(x, t_ref)]);
    let buried = interner.index_access(open_object, interner.literal_string("x"));
    assert_eq!(evaluate_type(&interner, &defs, buried), buried);
}
