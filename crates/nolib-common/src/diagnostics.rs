//! Diagnostics with TypeScript-compatible error codes.
//!
//! The solver has a small failure surface: applying a generic definition can
//! fail on arity, on an unsatisfied constraint, or by exceeding the
//! evaluation depth limit. Codes and message templates follow the TypeScript
//! compiler's numbering so the rendered text reads exactly like `tsc` output
//! for the same program.

use serde::Serialize;
use std::fmt;

/// Severity of a diagnostic.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl DiagnosticCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        }
    }
}

/// A diagnostic template: code, severity, and message text with `{0}`-style
/// placeholders.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_messages {
    use super::{DiagnosticCategory, DiagnosticMessage};

    /// TS2304: Cannot find name '{0}'.
    pub const CANNOT_FIND_NAME: DiagnosticMessage = DiagnosticMessage {
        code: 2304,
        category: DiagnosticCategory::Error,
        message: "Cannot find name '{0}'.",
    };

    /// TS2314: Generic type '{0}' requires {1} type argument(s).
    pub const GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS: DiagnosticMessage = DiagnosticMessage {
        code: 2314,
        category: DiagnosticCategory::Error,
        message: "Generic type '{0}' requires {1} type argument(s).",
    };

    /// TS2344: Type '{0}' does not satisfy the constraint '{1}'.
    pub const TYPE_DOES_NOT_SATISFY_CONSTRAINT: DiagnosticMessage = DiagnosticMessage {
        code: 2344,
        category: DiagnosticCategory::Error,
        message: "Type '{0}' does not satisfy the constraint '{1}'.",
    };

    /// TS2589: Type instantiation is excessively deep and possibly infinite.
    pub const TYPE_INSTANTIATION_EXCESSIVELY_DEEP: DiagnosticMessage = DiagnosticMessage {
        code: 2589,
        category: DiagnosticCategory::Error,
        message: "Type instantiation is excessively deep and possibly infinite.",
    };
}

/// Substitute `{0}`, `{1}`, ... placeholders in a message template.
///
/// Placeholders with no matching argument are left as-is, matching the
/// TypeScript compiler's formatter.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open..];
        match after.find('}') {
            Some(close) => {
                let index = after[1..close].parse::<usize>().ok();
                match index.and_then(|i| args.get(i)) {
                    Some(arg) => result.push_str(arg),
                    None => result.push_str(&after[..=close]),
                }
                rest = &after[close + 1..];
            }
            None => {
                result.push_str(after);
                return result;
            }
        }
    }
    result.push_str(rest);
    result
}

/// A rendered diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message_text: String,
}

impl Diagnostic {
    /// Build a diagnostic from a template and its arguments.
    pub fn from_template(template: DiagnosticMessage, args: &[&str]) -> Self {
        Diagnostic {
            category: template.category,
            code: template.code,
            message_text: format_message(template.message, args),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} TS{}: {}",
            self.category.as_str(),
            self.code,
            self.message_text
        )
    }
}
