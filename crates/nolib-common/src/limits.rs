//! Centralized limits and thresholds for the solver.
//!
//! This module provides shared constants for recursion depths, expansion
//! counts, and capacity limits used throughout the codebase. Centralizing
//! these values:
//! - Prevents duplicate definitions with inconsistent values
//! - Makes it easy to tune limits in one place
//! - Documents the rationale for each limit

// =============================================================================
// Recursion Depth Limits
// =============================================================================
// These prevent runaway recursion in deeply nested type structures.

/// Maximum depth for type evaluation.
///
/// Prevents infinite recursion when evaluating self-referential generic
/// definitions. When this depth is exceeded the solver reports **TS2589**:
/// *"Type instantiation is excessively deep and possibly infinite."* and the
/// evaluation result is the error type.
///
/// # TypeScript example
///
/// ```typescript
/// // A type alias that keeps expanding forever:
/// type Loop<T> = Loop<{ value: T }>;
/// type Boom = Loop<string>;
/// //   ~~~~ TS2589: Type instantiation is excessively deep and possibly infinite.
/// ```
pub const MAX_EVALUATION_DEPTH: u32 = 50;

/// Maximum depth for assignability checking.
///
/// Recursive structural types are compared coinductively: an in-progress
/// `(source, target)` pair is assumed assignable when revisited. The depth
/// limit is a second line of defense for pathological inputs that generate
/// fresh pairs on every level; past it the checker answers `true`, matching
/// the coinductive assumption.
///
/// # TypeScript example
///
/// ```typescript
/// interface List<T> { value: T; next: List<T>; }
/// declare let a: List<string>;
/// declare let b: List<string | number>;
/// b = a; // recurses through `next` until the pair cache or depth stops it
/// ```
pub const MAX_ASSIGNABILITY_DEPTH: u32 = 100;

// =============================================================================
// Expansion Limits
// =============================================================================
// These bound how much a single evaluation step may fan out.

/// Maximum keys in a mapped type expansion.
///
/// Mapped types iterate over a key set to produce properties. If the key set
/// is larger than this, expansion is aborted and the result is the error
/// type.
///
/// # TypeScript example
///
/// ```typescript
/// interface BigConfig {
///   option1: string;
///   // ... 500+ properties
/// }
/// type ReadonlyConfig = Readonly<BigConfig>; // iterates every key
/// ```
pub const MAX_MAPPED_KEYS: usize = 500;

/// Maximum union members when distributing a conditional type or an indexed
/// access over a union.
///
/// `T extends U ? X : Y` applied to a union `T` evaluates once per member,
/// as does `T[K]` with a union `K`. This caps the fan-out; past it the
/// result is the error type.
///
/// # TypeScript example
///
/// ```typescript
/// type IsString<T> = T extends string ? "yes" : "no";
/// type Result = IsString<"a" | "b" | "c">; // three distributed arms
/// ```
pub const MAX_DISTRIBUTION_SIZE: usize = 100;

// =============================================================================
// Capacity/Size Limits
// =============================================================================

/// Threshold for building a property-name lookup map on an object shape.
///
/// Below this count, property lookup is a linear scan over the sorted
/// property array — cache locality makes this fast. At or above the
/// threshold, the interner builds and caches a name-to-index map for the
/// shape.
///
/// # TypeScript example
///
/// ```typescript
/// // Small object (≤24 properties) → linear scan:
/// interface User { id: number; name: string; email: string; }
///
/// // Large object (>24 properties) → cached lookup map:
/// interface LargeConfig { prop1: string; /* ... */ prop25: string; }
/// ```
pub const PROPERTY_MAP_THRESHOLD: usize = 24;

/// Inline capacity for type lists (union members, tuple elements, etc.).
///
/// Lists assembled as `SmallVec<[TypeId; 8]>` hold up to 8 elements without
/// heap allocation. Most unions and tuples have fewer than 8 members, so
/// this avoids allocation in the common case.
///
/// # TypeScript example
///
/// ```typescript
/// // Fits inline (≤8 members, no heap allocation):
/// type Status = "pending" | "active" | "completed" | "failed";
///
/// // Spills to heap (>8 members):
/// type BigUnion = "a" | "b" | "c" | "d" | "e" | "f" | "g" | "h" | "i";
/// ```
pub const TYPE_LIST_INLINE: usize = 8;

// =============================================================================
// Stack Management
// =============================================================================

/// Remaining-stack threshold below which evaluation grows the stack.
///
/// Checked via `stacker::maybe_grow` on every recursive evaluation entry.
pub const STACK_RED_ZONE: usize = 64 * 1024;

/// Size of each new stack segment allocated when the red zone is hit.
pub const STACK_GROWTH: usize = 4 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_limits_are_positive() {
        assert!(MAX_EVALUATION_DEPTH > 0);
        assert!(MAX_ASSIGNABILITY_DEPTH >= MAX_EVALUATION_DEPTH);
    }

    #[test]
    fn growth_exceeds_red_zone() {
        assert!(STACK_GROWTH > STACK_RED_ZONE);
    }
}
