//! The solver façade.
//!
//! [`Solver`] bundles a type interner, a definition store with the utility
//! operator catalog pre-registered, and the application pipeline: arity
//! check, constraint check, substitution, evaluation. Every entry point
//! takes `&self`, so one solver can be shared across threads and queried
//! concurrently.
//!
//! Application is the only fallible surface. Evaluation itself is total
//! and poisons failures with the error type; [`Solver::apply`] is where
//! those outcomes turn into diagnostics with TypeScript error codes.

use nolib_common::Diagnostic;
use nolib_common::diagnostics::diagnostic_messages;
use tracing::{debug, trace};

use crate::def::{DefId, DefinitionInfo, DefinitionStore};
use crate::evaluate::{TypeEvaluator, evaluate_type};
use crate::format::TypeFormatter;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::subtype::is_assignable;
use crate::types::{PropertyInfo, TypeId, TypeParamInfo};
use crate::utilities::{Utilities, register_utilities};

pub struct Solver {
    interner: TypeInterner,
    defs: DefinitionStore,
    utilities: Utilities,
}

impl Solver {
    /// A fresh solver with the utility catalog registered.
    pub fn new() -> Self {
        let interner = TypeInterner::new();
        let defs = DefinitionStore::new();
        let utilities = register_utilities(&interner, &defs);
        Solver {
            interner,
            defs,
            utilities,
        }
    }

    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    pub fn defs(&self) -> &DefinitionStore {
        &self.defs
    }

    pub fn utilities(&self) -> &Utilities {
        &self.utilities
    }

    // -- registration ------------------------------------------------------

    /// Register `type Name<params> = body;`.
    pub fn register_alias(
        &self,
        name: &str,
        type_params: Vec<TypeParamInfo>,
        body: TypeId,
    ) -> DefId {
        let name = self.interner.intern_string(name);
        self.defs
            .register(DefinitionInfo::type_alias(name, type_params, body))
    }

    /// Register `interface Name { ... }` from its property list. The
    /// returned id names the definition; [`Solver::reference`] builds a
    /// type that refers to it.
    pub fn register_interface(&self, name: &str, properties: Vec<PropertyInfo>) -> DefId {
        let name_atom = self.interner.intern_string(name);
        let body = self.interner.object(properties);
        self.defs
            .register(DefinitionInfo::interface(name_atom, vec![], body))
    }

    /// A `Lazy` reference to a registered definition.
    pub fn reference(&self, def: DefId) -> TypeId {
        self.interner.lazy(def)
    }

    /// Resolve a definition by name. Unknown names report TS2304.
    pub fn resolve_name(&self, name: &str) -> Result<DefId, Diagnostic> {
        let atom = self.interner.intern_string(name);
        self.defs.lookup_name(atom).ok_or_else(|| {
            Diagnostic::from_template(diagnostic_messages::CANNOT_FIND_NAME, &[name])
        })
    }

    // -- application -------------------------------------------------------

    /// Apply a generic definition to type arguments.
    ///
    /// The pipeline mirrors what a checker does at a type reference site:
    /// 1. arity against the parameter list, filling trailing defaults
    ///    (TS2314 on a miss);
    /// 2. each argument against its parameter's constraint, instantiated
    ///    with the bindings accumulated so far (TS2344);
    /// 3. substitution into the body and evaluation to normal form, with
    ///    the depth limit surfacing as TS2589.
    pub fn apply(&self, def: DefId, args: &[TypeId]) -> Result<TypeId, Diagnostic> {
        let Some(info) = self.defs.get(def) else {
            let label = format!("#{}", def.0);
            return Err(Diagnostic::from_template(
                diagnostic_messages::CANNOT_FIND_NAME,
                &[&label],
            ));
        };
        let required = info
            .type_params
            .iter()
            .filter(|p| p.default.is_none())
            .count();
        if args.len() < required || args.len() > info.type_params.len() {
            trace!(def = def.0, supplied = args.len(), required, "arity mismatch");
            return Err(self.arity_diagnostic(info.name, required));
        }

        let mut evaluator = TypeEvaluator::new(&self.interner, &self.defs);
        let mut subst = TypeSubstitution::new();
        for (index, param) in info.type_params.iter().enumerate() {
            let arg = match args.get(index) {
                Some(&arg) => evaluator.evaluate(arg),
                None => match param.default {
                    Some(default) => {
                        let filled = instantiate_type(&self.interner, default, &subst);
                        evaluator.evaluate(filled)
                    }
                    // A required parameter after defaulted ones; the count
                    // check above cannot see this shape.
                    None => return Err(self.arity_diagnostic(info.name, required)),
                },
            };
            if let Some(constraint) = param.constraint {
                let constraint = instantiate_type(&self.interner, constraint, &subst);
                let constraint = evaluator.evaluate(constraint);
                if !is_assignable(&self.interner, &self.defs, arg, constraint) {
                    let formatter = TypeFormatter::with_defs(&self.interner, &self.defs);
                    let arg_text = formatter.format(arg);
                    let constraint_text = formatter.format(constraint);
                    debug!(
                        def = def.0,
                        arg = %arg_text,
                        constraint = %constraint_text,
                        "constraint violated"
                    );
                    return Err(Diagnostic::from_template(
                        diagnostic_messages::TYPE_DOES_NOT_SATISFY_CONSTRAINT,
                        &[&arg_text, &constraint_text],
                    ));
                }
            }
            subst.insert(param.name, arg);
        }

        let instantiated = instantiate_type(&self.interner, info.body, &subst);
        let result = evaluator.evaluate(instantiated);
        if evaluator.hit_depth_limit() {
            debug!(def = def.0, "instantiation depth limit exceeded");
            return Err(Diagnostic::from_template(
                diagnostic_messages::TYPE_INSTANTIATION_EXCESSIVELY_DEEP,
                &[],
            ));
        }
        trace!(def = def.0, result = result.0, "applied definition");
        Ok(result)
    }

    /// Apply a definition by name: `solver.apply_named("Pick", &[t, k])`.
    pub fn apply_named(&self, name: &str, args: &[TypeId]) -> Result<TypeId, Diagnostic> {
        let def = self.resolve_name(name)?;
        self.apply(def, args)
    }

    fn arity_diagnostic(&self, name: nolib_common::Atom, required: usize) -> Diagnostic {
        let name = self.interner.resolve_atom(name);
        let required_text = required.to_string();
        Diagnostic::from_template(
            diagnostic_messages::GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS,
            &[&name, &required_text],
        )
    }

    // -- the utility operators ---------------------------------------------

    /// `Properties<T>` — the keys of `T` as a literal union.
    pub fn properties(&self, t: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.properties, &[t])
    }

    /// `Partial<T>` — every property optional.
    pub fn partial(&self, t: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.partial, &[t])
    }

    /// `Required<T>` — every property required.
    pub fn required(&self, t: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.required, &[t])
    }

    /// `Readonly<T>` — every property readonly.
    pub fn readonly_type(&self, t: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.readonly, &[t])
    }

    /// `Record<K, V>` — an object with key set `K` and value type `V`.
    pub fn record(&self, keys: TypeId, value: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.record, &[keys, value])
    }

    /// `Pick<T, K>` — the properties of `T` named by `K`.
    pub fn pick(&self, t: TypeId, keys: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.pick, &[t, keys])
    }

    /// `Omit<T, K>` — the properties of `T` not named by `K`.
    pub fn omit(&self, t: TypeId, keys: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.omit, &[t, keys])
    }

    /// `Exclude<T, U>` — the members of `T` not assignable to `U`.
    pub fn exclude(&self, t: TypeId, u: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.exclude, &[t, u])
    }

    /// `Extract<T, U>` — the members of `T` assignable to `U`.
    pub fn extract(&self, t: TypeId, u: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.extract, &[t, u])
    }

    /// `NonNullable<T>` — `T` without `null` and `undefined`.
    pub fn non_nullable(&self, t: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.non_nullable, &[t])
    }

    /// `Parameters<F>` — the parameter list of `F` as a labeled tuple.
    pub fn parameters(&self, function: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.parameters, &[function])
    }

    /// `ReturnType<F>` — the return type of `F`.
    pub fn return_type(&self, function: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.return_type, &[function])
    }

    /// `Values<T>` — the union of `T`'s property types.
    pub fn values(&self, t: TypeId) -> Result<TypeId, Diagnostic> {
        self.apply(self.utilities.values, &[t])
    }

    // -- queries -----------------------------------------------------------

    /// Evaluate a type to normal form. Total; failures poison to the error
    /// type instead of reporting.
    pub fn evaluate(&self, ty: TypeId) -> TypeId {
        evaluate_type(&self.interner, &self.defs, ty)
    }

    /// Structural assignability between two types.
    pub fn is_assignable(&self, source: TypeId, target: TypeId) -> bool {
        is_assignable(&self.interner, &self.defs, source, target)
    }

    /// Render a type in TypeScript syntax, resolving definition names.
    pub fn format_type(&self, ty: TypeId) -> String {
        TypeFormatter::with_defs(&self.interner, &self.defs).format(ty)
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/solver_tests.rs"]
mod solver_tests;
