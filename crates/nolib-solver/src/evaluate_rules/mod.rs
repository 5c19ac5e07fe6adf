//! Per-operator evaluation rules.
//!
//! Each module extends [`crate::evaluate::TypeEvaluator`] with the reduction
//! rules for one operator form.

pub(crate) mod conditional;
pub(crate) mod index_access;
pub(crate) mod infer_pattern;
pub(crate) mod keyof;
pub(crate) mod mapped;
