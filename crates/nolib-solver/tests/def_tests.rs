use super::*;
use crate::intern::TypeInterner;
use crate::types::PropertyInfo;

#[test]
fn test_def_id_validity() {
    assert!(!DefId::INVALID.is_valid());
    assert!(DefId::FIRST_VALID.is_valid());
    assert!(DefId(100).is_valid());
}

#[test]
fn test_definition_store_basic() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let name = interner.intern_string("Foo");
    let def_id = store.register(DefinitionInfo::type_alias(name, vec![], TypeId::NUMBER));
    assert!(def_id.is_valid());

    let retrieved = store.get(def_id).expect("definition exists");
    assert_eq!(retrieved.kind, DefKind::TypeAlias);
    assert_eq!(retrieved.name, name);
    assert_eq!(retrieved.body, TypeId::NUMBER);
    assert!(retrieved.type_params.is_empty());

    assert_eq!(store.get_kind(def_id), Some(DefKind::TypeAlias));
    assert_eq!(store.get_name(def_id), Some(name));
    assert_eq!(store.get_body(def_id), Some(TypeId::NUMBER));
    assert_eq!(store.get_type_params(def_id), Some(vec![]));
}

#[test]
fn test_definition_store_generic_alias() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let name = interner.intern_string("Box");
    let t = interner.intern_string("T");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));
    let def_id = store.register(DefinitionInfo::type_alias(
        name,
        vec![TypeParamInfo::new(t)],
        t_ref,
    ));

    let params = store.get_type_params(def_id).expect("definition exists");
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name, t);
    assert_eq!(params[0].constraint, None);
}

#[test]
fn test_definition_store_interface() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let name = interner.intern_string("Point");
    let x = interner.intern_string("x");
    let y = interner.intern_string("y");
    let body = interner.object(vec![
        PropertyInfo::new(x, TypeId::NUMBER),
        PropertyInfo::new(y, TypeId::NUMBER),
    ]);

    let def_id = store.register(DefinitionInfo::interface(name, vec![], body));
    assert_eq!(store.get_kind(def_id), Some(DefKind::Interface));
    assert_eq!(store.get_body(def_id), Some(body));
}

#[test]
fn test_missing_definition_is_none() {
    let store = DefinitionStore::new();
    assert!(store.get(DefId(42)).is_none());
    assert!(store.get_kind(DefId(42)).is_none());
    assert!(store.is_empty());
}

#[test]
fn test_lookup_name() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let name = interner.intern_string("Fruit");
    let other = interner.intern_string("Vegetable");
    let def_id = store.register(DefinitionInfo::type_alias(name, vec![], TypeId::STRING));

    assert_eq!(store.lookup_name(name), Some(def_id));
    assert_eq!(store.lookup_name(other), None);
}

#[test]
fn test_later_registration_shadows_name() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let name = interner.intern_string("Dup");
    let first = store.register(DefinitionInfo::type_alias(name, vec![], TypeId::STRING));
    let second = store.register(DefinitionInfo::type_alias(name, vec![], TypeId::NUMBER));
    assert_ne!(first, second);

    // The name index sees the newer definition; both stay retrievable by id.
    assert_eq!(store.lookup_name(name), Some(second));
    assert_eq!(store.get_body(first), Some(TypeId::STRING));
    assert_eq!(store.len(), 2);
    assert_eq!(store.all_ids().len(), 1);
}

#[test]
fn test_registration_order() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    let a = store.register(DefinitionInfo::type_alias(
        interner.intern_string("A"),
        vec![],
        TypeId::STRING,
    ));
    let b = store.register(DefinitionInfo::type_alias(
        interner.intern_string("B"),
        vec![],
        TypeId::NUMBER,
    ));
    assert_eq!(a, DefId::FIRST_VALID);
    assert!(b.0 > a.0);
    assert_eq!(store.all_ids(), vec![a, b]);
}

#[test]
fn test_set_body_patches_recursive_definition() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();

    // interface List { next: List } — the body needs the id it is part of.
    let name = interner.intern_string("List");
    let def_id = store.register(DefinitionInfo::interface(name, vec![], TypeId::ERROR));
    let next = interner.intern_string("next");
    let body = interner.object(vec![PropertyInfo::new(next, interner.lazy(def_id))]);

    assert!(store.set_body(def_id, body));
    assert_eq!(store.get_body(def_id), Some(body));

    assert!(!store.set_body(DefId(999), TypeId::STRING));
}

#[test]
fn test_definition_store_concurrent() {
    use std::thread;

    let store = std::sync::Arc::new(DefinitionStore::new());

    let handles: Vec<_> = (0u32..4)
        .map(|i| {
            let store = store.clone();
            thread::spawn(move || {
                let mut ids = Vec::with_capacity(50);
                for j in 0u32..50 {
                    let info = DefinitionInfo::type_alias(
                        Atom(i * 1000 + j),
                        vec![],
                        TypeId::NUMBER,
                    );
                    let id = store.register(info);
                    assert!(store.get(id).is_some());
                    ids.push(id);
                }
                ids
            })
        })
        .collect();

    let mut all: Vec<DefId> = Vec::new();
    for handle in handles {
        all.extend(handle.join().expect("thread completed"));
    }

    assert_eq!(store.len(), 200);
    all.sort();
    all.dedup();
    assert_eq!(all.len(), 200, "every registration got a distinct id");
}
