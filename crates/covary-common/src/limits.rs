//! Centralized limits for the override checker.
//!
//! The interchange model is produced by an external builder and is expected to
//! be acyclic, but nothing verifies that before a check runs. Every walk over
//! base classes, super-interfaces or nested type references is bounded by one
//! of the limits below so that a malformed assembly fails closed instead of
//! looping.
//!
//! Solver walks consume these through
//! [`covary_solver::recursion::RecursionProfile`]; the profiles are the single
//! place the numbers are read from.

/// Maximum number of nested frames while walking an interface graph.
///
/// Base-class chains are followed iteratively and are bounded only by the
/// classes already seen on them, so this applies to super-interface nesting
/// alone. Hitting it is reported as a walk limit, never as a cycle.
pub const MAX_INHERITANCE_DEPTH: u32 = 256;

/// Total enter attempts allowed for a single inheritance walk.
///
/// Each interface is entered at most once per walk, so this only bounds
/// graphs with more interfaces than any real API surface declares.
pub const MAX_INHERITANCE_ITERATIONS: u32 = 100_000;

/// Maximum nesting of composite type references (`array<map<...>>`).
pub const MAX_TYPE_REFERENCE_DEPTH: u32 = 64;

/// Total enter attempts allowed while descending a single type reference.
pub const MAX_TYPE_REFERENCE_ITERATIONS: u32 = 10_000;

/// Upper bound on the number of related-information entries attached to one
/// diagnostic. Explanation chains longer than this are truncated.
pub const MAX_RELATED_INFORMATION: usize = 8;
