use super::*;

fn named_object(solver: &Solver) -> TypeId {
    let name = solver.interner().intern_string("name");
    solver
        .interner()
        .object(vec![PropertyInfo::new(name, TypeId::STRING)])
}

#[test]
fn test_apply_named_resolves_and_applies() {
    let solver = Solver::new();
    let object = named_object(&solver);
    let name = solver.interner().intern_string("name");

    let result = solver.apply_named("Partial", &[object]).unwrap();
    assert_eq!(
        result,
        solver
            .interner()
            .object(vec![PropertyInfo::opt(name, TypeId::STRING)])
    );
}

#[test]
fn test_apply_evaluates_arguments_first() {
    let solver = Solver::new();
    let object = named_object(&solver);
    let name = solver.interner().intern_string("name");
    let def_id = solver.register_alias("Named", vec![], object);

    let result = solver.partial(solver.reference(def_id)).unwrap();
    assert_eq!(
        result,
        solver
            .interner()
            .object(vec![PropertyInfo::opt(name, TypeId::STRING)])
    );
}

#[test]
fn test_alias_application_without_parameters() {
    let solver = Solver::new();
    let def_id = solver.register_alias("Name", vec![], TypeId::STRING);
    assert_eq!(solver.apply(def_id, &[]).unwrap(), TypeId::STRING);
    assert_eq!(solver.evaluate(solver.reference(def_id)), TypeId::STRING);
}

// ===== Diagnostics =====

#[test]
fn test_unknown_name_reports_ts2304() {
    let solver = Solver::new();
    let diagnostic = solver.resolve_name("Banana").unwrap_err();
    assert_eq!(diagnostic.code, 2304);
    assert_eq!(diagnostic.message_text, "Cannot find name 'Banana'.");
    assert_eq!(
        diagnostic.to_string(),
        "error TS2304: Cannot find name 'Banana'."
    );
}

#[test]
fn test_unknown_definition_id_reports_ts2304() {
    let solver = Solver::new();
    let diagnostic = solver.apply(DefId(9999), &[TypeId::STRING]).unwrap_err();
    assert_eq!(diagnostic.code, 2304);
    assert_eq!(diagnostic.message_text, "Cannot find name '#9999'.");
}

#[test]
fn test_arity_mismatch_reports_ts2314() {
    let solver = Solver::new();
    let object = named_object(&solver);

    let missing = solver.apply_named("Pick", &[object]).unwrap_err();
    assert_eq!(missing.code, 2314);
    assert_eq!(
        missing.message_text,
        "Generic type 'Pick' requires 2 type argument(s)."
    );

    let extra = solver
        .apply_named("Pick", &[object, TypeId::STRING, TypeId::NUMBER])
        .unwrap_err();
    assert_eq!(extra.code, 2314);
    assert_eq!(
        extra.message_text,
        "Generic type 'Pick' requires 2 type argument(s)."
    );
}

#[test]
fn test_required_parameter_after_default_reports_ts2314() {
    let solver = Solver::new();
    let a = solver.interner().intern_string("A");
    let b = solver.interner().intern_string("B");
    let b_ref = solver.interner().type_parameter(TypeParamInfo::new(b));

    // Gap<A = string, B> cannot be satisfied by one argument: it binds A
    // and leaves B with neither argument nor default.
    let def_id = solver.register_alias(
        "Gap",
        vec![
            TypeParamInfo {
                name: a,
                constraint: None,
                default: Some(TypeId::STRING),
            },
            TypeParamInfo::new(b),
        ],
        b_ref,
    );

    let diagnostic = solver.apply(def_id, &[TypeId::NUMBER]).unwrap_err();
    assert_eq!(diagnostic.code, 2314);
    assert_eq!(
        diagnostic.message_text,
        "Generic type 'Gap' requires 1 type argument(s)."
    );
}

#[test]
fn test_constraint_violation_reports_ts2344() {
    let solver = Solver::new();

    let record = solver.record(TypeId::BOOLEAN, TypeId::STRING).unwrap_err();
    assert_eq!(record.code, 2344);
    assert_eq!(
        record.message_text,
        "Type 'boolean' does not satisfy the constraint 'string | number | symbol'."
    );

    let parameters = solver.parameters(TypeId::STRING).unwrap_err();
    assert_eq!(parameters.code, 2344);
    assert_eq!(
        parameters.message_text,
        "Type 'string' does not satisfy the constraint '(...args: any) => any'."
    );
}

#[test]
fn test_pick_foreign_key_reports_ts2344() {
    let solver = Solver::new();
    let object = named_object(&solver);
    let bad = solver.interner().literal_string("bad");

    let diagnostic = solver.pick(object, bad).unwrap_err();
    assert_eq!(diagnostic.code, 2344);
    assert_eq!(
        diagnostic.message_text,
        "Type '\"bad\"' does not satisfy the constraint '\"name\"'."
    );
}

#[test]
fn test_runaway_instantiation_reports_ts2589() {
    let solver = Solver::new();
    let interner = solver.interner();
    let t = interner.intern_string("T");
    let value = interner.intern_string("value");
    let t_ref = interner.type_parameter(TypeParamInfo::new(t));

    // Loop<T> = Loop<{ value: T }>
    let def_id = solver.register_alias("Loop", vec![TypeParamInfo::new(t)], TypeId::ERROR);
    let wrapped = interner.object(vec![PropertyInfo::new(value, t_ref)]);
    let body = interner.application(solver.reference(def_id), vec![wrapped]);
    solver.defs().set_body(def_id, body);

    let diagnostic = solver.apply(def_id, &[TypeId::STRING]).unwrap_err();
    assert_eq!(diagnostic.code, 2589);
    assert_eq!(
        diagnostic.message_text,
        "Type instantiation is excessively deep and possibly infinite."
    );
}

// ===== Queries =====

#[test]
fn test_query_helpers() {
    let solver = Solver::new();
    let interner = solver.interner();

    assert!(solver.is_assignable(interner.literal_string("a"), TypeId::STRING));
    assert!(!solver.is_assignable(TypeId::STRING, TypeId::NUMBER));
    assert_eq!(
        solver.format_type(interner.union2(TypeId::STRING, TypeId::NUMBER)),
        "string | number"
    );
}

// ===== Concurrency =====

#[test]
fn test_shared_solver_answers_concurrent_queries() {
    use once_cell::sync::Lazy;
    use rayon::prelude::*;

    static SHARED: Lazy<(Solver, TypeId)> = Lazy::new(|| {
        let solver = Solver::new();
        let interner = solver.interner();
        let fruit = interner.object(vec![
            PropertyInfo::new(interner.intern_string("name"), TypeId::STRING),
            PropertyInfo::new(interner.intern_string("sweetness"), TypeId::NUMBER),
        ]);
        (solver, fruit)
    });

    let (solver, fruit) = &*SHARED;
    let expected_partial = solver.partial(*fruit).unwrap();
    let expected_keys = solver.properties(*fruit).unwrap();

    let results: Vec<(TypeId, TypeId)> = (0..64)
        .into_par_iter()
        .map(|_| {
            (
                solver.partial(*fruit).unwrap(),
                solver.properties(*fruit).unwrap(),
            )
        })
        .collect();
    for (partial, keys) in results {
        assert_eq!(partial, expected_partial);
        assert_eq!(keys, expected_keys);
    }
}
