//! Recursion guards for the inheritance walks and type-reference descent.
//!
//! The interchange model promises acyclic base chains and interface graphs,
//! but nothing checks that before the covariance engine runs. Every walk goes
//! through one of the guards below so that a malformed assembly terminates
//! with a "not found" answer instead of looping.
//!
//! - [`RecursionGuard`] tracks the keys on the current path (cycle detection),
//!   the nesting depth and a total iteration budget.
//! - [`DepthCounter`] only limits nesting depth, for walks where the same
//!   shape may legitimately appear twice on a path (`array<array<T>>`).
//!
//! # Debug-mode safety
//!
//! Dropping a guard with entries still active panics in debug builds, which
//! catches a forgotten `leave()` on an early-return path.

use covary_common::limits;
use rustc_hash::FxHashSet;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Limit presets for the two kinds of walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Interface graphs, keyed by fqn.
    ///
    /// depth = 256, iterations = 100,000
    InheritanceWalk,

    /// Nested composite type references (`array<array<...>>`).
    ///
    /// depth = 64, iterations = 10,000
    TypeReferenceNesting,

    /// Explicit limits, mostly for tests.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::InheritanceWalk => limits::MAX_INHERITANCE_DEPTH,
            Self::TypeReferenceNesting => limits::MAX_TYPE_REFERENCE_DEPTH,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::InheritanceWalk => limits::MAX_INHERITANCE_ITERATIONS,
            Self::TypeReferenceNesting => limits::MAX_TYPE_REFERENCE_ITERATIONS,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Outcome of [`RecursionGuard::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    /// The walk may continue.
    Entered,
    /// This key is already on the current path.
    Cycle,
    /// The path got too deep.
    DepthExceeded,
    /// The walk as a whole took too many steps.
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }

    #[inline]
    pub fn is_denied(self) -> bool {
        !self.is_entered()
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Tracks the keys on the current walk path, the nesting depth and the total
/// number of enter attempts.
///
/// ```ignore
/// let mut guard = RecursionGuard::with_profile(RecursionProfile::InheritanceWalk);
///
/// match guard.enter(fqn) {
///     RecursionResult::Entered => {
///         let found = walk_parents();
///         guard.leave(fqn);
///         found
///     }
///     RecursionResult::Cycle => false,
///     RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => false,
/// }
/// ```
///
/// Only the *current path* is tracked: a diamond in an interface graph visits
/// the shared ancestor twice without being reported as a cycle.
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    /// Most callers want [`with_profile`](Self::with_profile).
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Push `key` onto the current path.
    ///
    /// On [`RecursionResult::Entered`] the caller **must** call
    /// [`leave`](Self::leave) with the same key when done.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            return RecursionResult::Cycle;
        }

        self.depth += 1;
        RecursionResult::Entered
    }

    /// Pop `key` off the current path.
    ///
    /// # Debug panics
    ///
    /// Panics if `key` is not on the current path.
    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);

        debug_assert!(
            was_present,
            "left a walk that was never entered (or was left twice)"
        );

        self.depth = self.depth.saturating_sub(1);
    }

    /// Run `f` with `key` pushed onto the path.
    ///
    /// Returns `Err(reason)` without running `f` if entry was denied. `f`
    /// receives the guard so nested walks can re-enter it.
    pub fn scope<T>(
        &mut self,
        key: K,
        f: impl FnOnce(&mut Self) -> T,
    ) -> Result<T, RecursionResult> {
        match self.enter(key) {
            RecursionResult::Entered => {
                let result = f(self);
                self.leave(key);
                Ok(result)
            }
            denied => Err(denied),
        }
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Whether any limit was hit since construction or the last
    /// [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    /// Clear the path and counters. Limits are kept.
    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "walk guard dropped while {} fqn(s) were still on the path",
                self.visiting.len(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// A depth-only guard: no cycle detection.
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    /// Only the profile's `max_depth` is used.
    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Descend one level.
    ///
    /// Returns `false` (and does **not** increment) once the limit is reached;
    /// do not call `leave()` in that case.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return false;
        }
        self.depth += 1;
        true
    }

    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(
            self.depth > 0,
            "nesting counter left more levels than it entered"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if !std::thread::panicking() && self.depth > 0 {
            panic!(
                "nesting counter dropped at depth {}",
                self.depth,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
