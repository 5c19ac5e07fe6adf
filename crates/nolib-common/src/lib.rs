//! Shared foundations for the nolib structural type solver.
//!
//! This crate carries the pieces every other crate needs:
//! - String interning ([`interner::Atom`], [`interner::Interner`])
//! - Diagnostics with TypeScript-compatible error codes ([`diagnostics`])
//! - Centralized resource limits ([`limits`])

pub mod diagnostics;
pub mod interner;
pub mod limits;

pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage, format_message};
pub use interner::{Atom, Interner};
