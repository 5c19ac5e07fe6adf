//! Structural type solver with a `noLib` universe.
//!
//! Rebuilds TypeScript's utility type catalog — `Partial`, `Required`,
//! `Readonly`, `Record`, `Pick`, `Omit`, `Exclude`, `Extract`,
//! `NonNullable`, `Parameters`, `ReturnType` — from four primitives:
//!
//! - **`keyof`**: key enumeration over structural shapes
//! - **Mapped types**: `{ [P in K]: T }` with modifier and key-remap support
//! - **Conditional types**: distributive `T extends U ? X : Y` over a
//!   coinductive assignability relation
//! - **`infer`**: structural pattern matching with placeholder capture
//!
//! Types are interned: equal structures intern to the same [`TypeId`], so
//! semantic equality of evaluated types is id equality. `noLib` means no
//! ambient declarations exist — primitives have no apparent members, and
//! `keyof string` is `never`.
//!
//! [`Solver`] is the front door: it owns the interner and definition store,
//! registers the utility catalog, and turns application failures into
//! diagnostics with TypeScript error codes.

pub mod def;
pub mod evaluate;
mod evaluate_rules;
pub mod format;
pub mod instantiate;
pub mod intern;
pub mod solver;
pub mod subtype;
pub mod types;
pub mod utilities;

pub use def::{DefId, DefKind, DefinitionInfo, DefinitionStore};
pub use evaluate::{TypeEvaluator, evaluate_type};
pub use format::TypeFormatter;
pub use instantiate::{TypeSubstitution, instantiate_type};
pub use intern::{PropertyLookup, TypeInterner};
pub use solver::Solver;
pub use subtype::{AssignabilityChecker, is_assignable};
pub use types::{
    ApplicationId, ConditionalType, ConditionalTypeId, FunctionShape, FunctionShapeId,
    IndexSignature, IntrinsicKind, LiteralValue, MappedModifier, MappedType, MappedTypeId,
    ObjectFlags, ObjectShape, ObjectShapeId, OrderedFloat, ParamInfo, PropertyInfo, TupleElement,
    TupleListId, TypeApplication, TypeData, TypeId, TypeListId, TypeParamInfo,
};
pub use utilities::{Utilities, register_utilities};

// Test modules: most are loaded by their source files via #[path = "../tests/..."]
// declarations. Only suites without a single home module are loaded here.
#[cfg(test)]
#[path = "../tests/keyof_comprehensive_tests.rs"]
mod keyof_comprehensive_tests;
// intern_tests: loaded from intern.rs
// def_tests: loaded from def.rs
// subtype_tests: loaded from subtype.rs
// instantiate_tests: loaded from instantiate.rs
// evaluate_tests: loaded from evaluate.rs
#[cfg(test)]
#[path = "../tests/index_access_comprehensive_tests.rs"]
mod index_access_comprehensive_tests;
#[cfg(test)]
#[path = "../tests/mapped_comprehensive_tests.rs"]
mod mapped_comprehensive_tests;
#[cfg(test)]
#[path = "../tests/conditional_comprehensive_tests.rs"]
mod conditional_comprehensive_tests;
#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod infer_tests;
// utilities_tests: loaded from utilities.rs
// solver_tests: loaded from solver.rs
// format_tests: loaded from format.rs
