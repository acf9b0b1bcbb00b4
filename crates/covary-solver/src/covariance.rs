//! Covariance checking for member overrides.
//!
//! Decides whether the declared type of a member may be narrowed at an
//! overriding declaration such that the narrowing stays sound in the *least*
//! permissive of the target languages that consume the same API description.
//!
//! The decision is an ordered rule list, first match wins:
//!
//! 1. void on exactly one side is rejected; void on both sides is accepted
//! 2. structurally equal references are accepted
//! 3. `array<A>` vs `array<B>` recurses on `A` vs `B` (the only place variance
//!    is inherited through composition)
//! 4. maps are invariant generic containers in every target: rejected
//! 5. unions are never narrowed: rejected
//! 6. intersections are input-only: rejected
//! 7. primitives have no subtype lattice: rejected
//! 8. any other shape mismatch (e.g. array vs named): rejected
//! 9. named references are resolved; unresolved types are rejected (fail-closed)
//! 10. class vs class: accepted iff the supertype is on the subtype's base chain
//! 11. interface vs interface: accepted iff the supertype is reachable through
//!     the subtype's super-interfaces
//! 12. class vs interface: accepted iff the class, one of its base classes, or
//!     one of their super-interfaces implements the supertype
//! 13. anything else (interface vs class, enums): rejected
//!
//! The engine knows nothing about call sites. Whether a site is allowed to use
//! a covariant answer at all (parameters, mutable properties, static members,
//! interface implementations) is decided by the policy layer in the checker.
//!
//! ## Tracer pattern
//!
//! The same rule list serves fast boolean queries ([`FastTracer`], no
//! allocation) and diagnostics ([`DiagnosticTracer`], collects
//! [`CovarianceFailureReason`]s). Reasons are built lazily through a closure so
//! the fast path never renders a type.
//!
//! ## Termination
//!
//! Base chains are followed iteratively; a class seen twice on one chain is a
//! cycle. Interface graphs are walked depth-first under a [`RecursionGuard`]
//! keyed by fqn, and every interface fully explored without reaching the
//! target is skipped for the rest of the query, so each interface is entered
//! at most once. Re-entering a type already on the walk path, or running out
//! of the walk budget, is treated as "not found".

use crate::assembly::{ClassType, InterfaceType, TypeDef, TypeKind};
use crate::recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
use crate::resolver::TypeResolver;
use crate::types::{CollectionKind, TypeReference};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt;
use tracing::trace;

// =============================================================================
// Failure reasons
// =============================================================================

/// Which side of a comparison is void.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoidSide {
    Subtype,
    Supertype,
}

/// Why a covariance query was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CovarianceFailureReason {
    VoidMismatch {
        void_side: VoidSide,
    },
    MalformedType {
        type_ref: String,
    },
    MapInvariant {
        subtype: String,
        supertype: String,
    },
    UnionNotNarrowable {
        subtype: String,
        supertype: String,
    },
    IntersectionNotCovariant {
        subtype: String,
        supertype: String,
    },
    PrimitiveNotNarrowable {
        subtype: String,
        supertype: String,
    },
    ShapeMismatch {
        subtype: String,
        supertype: String,
    },
    UnresolvedType {
        fqn: String,
    },
    InheritanceCycle {
        fqn: String,
    },
    WalkLimitExceeded {
        at: String,
    },
    NotASubclass {
        subtype: String,
        supertype: String,
    },
    InterfaceNotExtended {
        subtype: String,
        supertype: String,
    },
    InterfaceNotImplemented {
        subtype: String,
        supertype: String,
    },
    KindMismatch {
        subtype: String,
        subtype_kind: TypeKind,
        supertype: String,
        supertype_kind: TypeKind,
    },
    ArrayElementMismatch {
        subtype: String,
        supertype: String,
    },
}

impl fmt::Display for CovarianceFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CovarianceFailureReason::*;
        match self {
            VoidMismatch {
                void_side: VoidSide::Subtype,
            } => f.write_str("the overriding type is void but the overridden type is not"),
            VoidMismatch {
                void_side: VoidSide::Supertype,
            } => f.write_str("the overridden type is void but the overriding type is not"),
            MalformedType { type_ref } => write!(
                f,
                "'{type_ref}' contains a union or intersection with fewer than two members"
            ),
            MapInvariant { subtype, supertype } => {
                write!(f, "maps are invariant: '{subtype}' cannot narrow '{supertype}'")
            }
            UnionNotNarrowable { subtype, supertype } => write!(
                f,
                "union types cannot be narrowed: '{subtype}' cannot narrow '{supertype}'"
            ),
            IntersectionNotCovariant { subtype, supertype } => write!(
                f,
                "intersection types are input-only: '{subtype}' cannot narrow '{supertype}'"
            ),
            PrimitiveNotNarrowable { subtype, supertype } => write!(
                f,
                "primitive types have no subtypes: '{subtype}' cannot narrow '{supertype}'"
            ),
            ShapeMismatch { subtype, supertype } => {
                write!(f, "'{subtype}' and '{supertype}' have incompatible shapes")
            }
            UnresolvedType { fqn } => write!(f, "type '{fqn}' could not be resolved"),
            InheritanceCycle { fqn } => write!(f, "inheritance cycle detected at '{fqn}'"),
            WalkLimitExceeded { at } => write!(f, "inheritance walk limit exceeded at '{at}'"),
            NotASubclass { subtype, supertype } => {
                write!(f, "class '{subtype}' does not extend '{supertype}'")
            }
            InterfaceNotExtended { subtype, supertype } => {
                write!(f, "interface '{subtype}' does not extend '{supertype}'")
            }
            InterfaceNotImplemented { subtype, supertype } => {
                write!(f, "class '{subtype}' does not implement '{supertype}'")
            }
            KindMismatch {
                subtype,
                subtype_kind,
                supertype,
                supertype_kind,
            } => write!(
                f,
                "{subtype_kind} '{subtype}' cannot narrow {supertype_kind} '{supertype}'"
            ),
            ArrayElementMismatch { subtype, supertype } => write!(
                f,
                "array element type '{subtype}' cannot narrow '{supertype}'"
            ),
        }
    }
}

// =============================================================================
// Tracers
// =============================================================================

/// Receives failure reasons as the rule list rejects a query.
pub trait CovarianceTracer {
    /// `reason` is only invoked by tracers that keep reasons.
    fn on_mismatch(&mut self, reason: impl FnOnce() -> CovarianceFailureReason);
}

/// Boolean-only tracer; compiles down to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastTracer;

impl CovarianceTracer for FastTracer {
    #[inline(always)]
    fn on_mismatch(&mut self, _reason: impl FnOnce() -> CovarianceFailureReason) {}
}

/// Collects every reported reason, innermost first.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticTracer {
    reasons: Vec<CovarianceFailureReason>,
}

impl DiagnosticTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reasons ordered outermost first (the rule that rejected the query,
    /// then what it found underneath).
    pub fn into_reasons(self) -> Vec<CovarianceFailureReason> {
        let mut reasons = self.reasons;
        reasons.reverse();
        reasons
    }
}

impl CovarianceTracer for DiagnosticTracer {
    fn on_mismatch(&mut self, reason: impl FnOnce() -> CovarianceFailureReason) {
        self.reasons.push(reason());
    }
}

/// Result of [`explain_covariance`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CovarianceExplanation {
    pub allowed: bool,
    /// Empty when `allowed`.
    pub reasons: Vec<CovarianceFailureReason>,
}

impl CovarianceExplanation {
    /// The reason that rejected the query, if any.
    pub fn primary_reason(&self) -> Option<&CovarianceFailureReason> {
        self.reasons.first()
    }
}

// =============================================================================
// Shape classification
// =============================================================================

/// Coarse shape of a reference in rule order. Matching on pairs of shapes
/// without a wildcard keeps the rule list exhaustive at compile time.
enum Shape<'r> {
    Array(&'r TypeReference),
    Map,
    Union,
    Intersection,
    Primitive,
    Named(&'r str),
}

impl<'r> Shape<'r> {
    fn of(type_ref: &'r TypeReference) -> Self {
        match type_ref {
            TypeReference::Collection(c) => match c.kind {
                CollectionKind::Array => Shape::Array(&c.element_type),
                CollectionKind::Map => Shape::Map,
            },
            TypeReference::Union(_) => Shape::Union,
            TypeReference::Intersection(_) => Shape::Intersection,
            TypeReference::Primitive(_) => Shape::Primitive,
            TypeReference::Named(fqn) => Shape::Named(fqn),
        }
    }
}

// =============================================================================
// CovarianceChecker
// =============================================================================

/// Covariance engine bound to a resolver.
///
/// Holds only walk bookkeeping; it is cheap to create one per query, and a
/// single checker may also be reused for many queries on one thread.
pub struct CovarianceChecker<'a, R: TypeResolver + ?Sized> {
    resolver: &'a R,
    guard: RecursionGuard<&'a str>,
    nesting: DepthCounter,
    /// Classes already seen on the base chain being followed.
    chain: FxHashSet<&'a str>,
    /// Interfaces known not to reach the current target.
    explored: FxHashSet<&'a str>,
}

impl<'a, R: TypeResolver + ?Sized> CovarianceChecker<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self {
            resolver,
            guard: RecursionGuard::with_profile(RecursionProfile::InheritanceWalk),
            nesting: DepthCounter::with_profile(RecursionProfile::TypeReferenceNesting),
            chain: FxHashSet::default(),
            explored: FxHashSet::default(),
        }
    }

    /// Fast boolean query.
    pub fn is_allowed(
        &mut self,
        subtype: Option<&TypeReference>,
        supertype: Option<&TypeReference>,
    ) -> bool {
        self.check(subtype, supertype, &mut FastTracer)
    }

    /// Query that also reports why a narrowing was rejected.
    pub fn explain(
        &mut self,
        subtype: Option<&TypeReference>,
        supertype: Option<&TypeReference>,
    ) -> CovarianceExplanation {
        let mut tracer = DiagnosticTracer::new();
        let allowed = self.check(subtype, supertype, &mut tracer);
        CovarianceExplanation {
            allowed,
            reasons: if allowed {
                Vec::new()
            } else {
                tracer.into_reasons()
            },
        }
    }

    /// Run the rule list with an arbitrary tracer. `None` is void.
    pub fn check<T: CovarianceTracer>(
        &mut self,
        subtype: Option<&TypeReference>,
        supertype: Option<&TypeReference>,
        tracer: &mut T,
    ) -> bool {
        // Rule 1: void.
        let (sub, sup) = match (subtype, supertype) {
            (None, None) => return true,
            (Some(sub), Some(sup)) => (sub, sup),
            (sub, _) => {
                let void_side = if sub.is_none() {
                    VoidSide::Subtype
                } else {
                    VoidSide::Supertype
                };
                tracer.on_mismatch(|| CovarianceFailureReason::VoidMismatch { void_side });
                return false;
            }
        };

        for type_ref in [sub, sup] {
            if !type_ref.is_well_formed() {
                tracer.on_mismatch(|| CovarianceFailureReason::MalformedType {
                    type_ref: type_ref.to_string(),
                });
                return false;
            }
        }

        // Walk budgets are per query.
        self.guard.reset();
        let allowed = self.check_reference(sub, sup, tracer);
        trace!(subtype = %sub, supertype = %sup, allowed, "covariance query");
        allowed
    }

    fn check_reference<T: CovarianceTracer>(
        &mut self,
        sub: &TypeReference,
        sup: &TypeReference,
        tracer: &mut T,
    ) -> bool {
        // Rule 2: identity is always safe.
        if sub == sup {
            return true;
        }

        match (Shape::of(sub), Shape::of(sup)) {
            // Rule 3
            (Shape::Array(sub_elem), Shape::Array(sup_elem)) => {
                self.check_array_elements(sub_elem, sup_elem, tracer)
            }
            // Rule 4
            (Shape::Map, _) | (_, Shape::Map) => {
                tracer.on_mismatch(|| CovarianceFailureReason::MapInvariant {
                    subtype: sub.to_string(),
                    supertype: sup.to_string(),
                });
                false
            }
            // Rule 5
            (Shape::Union, _) | (_, Shape::Union) => {
                tracer.on_mismatch(|| CovarianceFailureReason::UnionNotNarrowable {
                    subtype: sub.to_string(),
                    supertype: sup.to_string(),
                });
                false
            }
            // Rule 6
            (Shape::Intersection, _) | (_, Shape::Intersection) => {
                tracer.on_mismatch(|| CovarianceFailureReason::IntersectionNotCovariant {
                    subtype: sub.to_string(),
                    supertype: sup.to_string(),
                });
                false
            }
            // Rule 7
            (Shape::Primitive, _) | (_, Shape::Primitive) => {
                tracer.on_mismatch(|| CovarianceFailureReason::PrimitiveNotNarrowable {
                    subtype: sub.to_string(),
                    supertype: sup.to_string(),
                });
                false
            }
            // Rule 8
            (Shape::Array(_), Shape::Named(_)) | (Shape::Named(_), Shape::Array(_)) => {
                tracer.on_mismatch(|| CovarianceFailureReason::ShapeMismatch {
                    subtype: sub.to_string(),
                    supertype: sup.to_string(),
                });
                false
            }
            // Rules 9-13
            (Shape::Named(sub_fqn), Shape::Named(sup_fqn)) => {
                self.check_named(sub_fqn, sup_fqn, tracer)
            }
        }
    }

    fn check_array_elements<T: CovarianceTracer>(
        &mut self,
        sub_elem: &TypeReference,
        sup_elem: &TypeReference,
        tracer: &mut T,
    ) -> bool {
        if !self.nesting.enter() {
            tracer.on_mismatch(|| CovarianceFailureReason::WalkLimitExceeded {
                at: format!("array<{sub_elem}>"),
            });
            return false;
        }
        let allowed = self.check_reference(sub_elem, sup_elem, tracer);
        self.nesting.leave();

        if !allowed {
            tracer.on_mismatch(|| CovarianceFailureReason::ArrayElementMismatch {
                subtype: sub_elem.to_string(),
                supertype: sup_elem.to_string(),
            });
        }
        allowed
    }

    fn check_named<T: CovarianceTracer>(
        &mut self,
        sub_fqn: &str,
        sup_fqn: &str,
        tracer: &mut T,
    ) -> bool {
        let resolver = self.resolver;
        self.explored.clear();

        // Rule 9: fail closed on anything we cannot see.
        let Some(sub_def) = resolver.resolve(sub_fqn) else {
            tracer.on_mismatch(|| CovarianceFailureReason::UnresolvedType {
                fqn: sub_fqn.to_string(),
            });
            return false;
        };
        let Some(sup_def) = resolver.resolve(sup_fqn) else {
            tracer.on_mismatch(|| CovarianceFailureReason::UnresolvedType {
                fqn: sup_fqn.to_string(),
            });
            return false;
        };

        match (sub_def, sup_def) {
            // Rule 10
            (TypeDef::Class(class), TypeDef::Class(_)) => {
                let found = self.class_extends(class, sup_fqn, tracer);
                if !found {
                    tracer.on_mismatch(|| CovarianceFailureReason::NotASubclass {
                        subtype: sub_fqn.to_string(),
                        supertype: sup_fqn.to_string(),
                    });
                }
                found
            }
            // Rule 11
            (TypeDef::Interface(iface), TypeDef::Interface(_)) => {
                let found = self.interface_extends(iface, sup_fqn, tracer);
                if !found {
                    tracer.on_mismatch(|| CovarianceFailureReason::InterfaceNotExtended {
                        subtype: sub_fqn.to_string(),
                        supertype: sup_fqn.to_string(),
                    });
                }
                found
            }
            // Rule 12
            (TypeDef::Class(class), TypeDef::Interface(_)) => {
                let found = self.class_implements(class, sup_fqn, tracer);
                if !found {
                    tracer.on_mismatch(|| CovarianceFailureReason::InterfaceNotImplemented {
                        subtype: sub_fqn.to_string(),
                        supertype: sup_fqn.to_string(),
                    });
                }
                found
            }
            // Rule 13
            (sub_def, sup_def) => {
                tracer.on_mismatch(|| CovarianceFailureReason::KindMismatch {
                    subtype: sub_fqn.to_string(),
                    subtype_kind: sub_def.kind(),
                    supertype: sup_fqn.to_string(),
                    supertype_kind: sup_def.kind(),
                });
                false
            }
        }
    }

    /// Walk `class`'s base chain looking for `target`. `class` itself does not
    /// count.
    fn class_extends<T: CovarianceTracer>(
        &mut self,
        class: &'a ClassType,
        target: &str,
        tracer: &mut T,
    ) -> bool {
        let resolver = self.resolver;
        self.chain.clear();
        let mut current = class;

        loop {
            if !self.enter_chain(current, tracer) {
                return false;
            }
            let Some(base) = current.base.as_deref() else {
                return false;
            };
            if base == target {
                return true;
            }
            match resolver.resolve(base) {
                Some(TypeDef::Class(base_class)) => current = base_class,
                // A non-class base ends the chain.
                Some(_) => return false,
                None => {
                    tracer.on_mismatch(|| CovarianceFailureReason::UnresolvedType {
                        fqn: base.to_string(),
                    });
                    return false;
                }
            }
        }
    }

    fn interface_extends<T: CovarianceTracer>(
        &mut self,
        iface: &'a InterfaceType,
        target: &str,
        tracer: &mut T,
    ) -> bool {
        if !self.enter(&iface.fqn, tracer) {
            return false;
        }
        let found = self.any_interface_reaches(&iface.interfaces, target, tracer);
        self.guard.leave(iface.fqn.as_str());

        // A walk cut short by a limit proves nothing about this interface.
        if !found && !self.guard.is_exceeded() {
            self.explored.insert(iface.fqn.as_str());
        }
        found
    }

    /// Depth-first search from a list of directly declared interfaces.
    fn any_interface_reaches<T: CovarianceTracer>(
        &mut self,
        interfaces: &'a [String],
        target: &str,
        tracer: &mut T,
    ) -> bool {
        let resolver = self.resolver;
        for fqn in interfaces {
            if fqn == target {
                return true;
            }
            if self.explored.contains(fqn.as_str()) {
                continue;
            }
            match resolver.resolve(fqn) {
                Some(TypeDef::Interface(parent)) => {
                    if self.interface_extends(parent, target, tracer) {
                        return true;
                    }
                }
                Some(_) => {}
                None => tracer.on_mismatch(|| CovarianceFailureReason::UnresolvedType {
                    fqn: fqn.clone(),
                }),
            }
        }
        false
    }

    /// Search the interfaces of `class` and of each class on its base chain.
    fn class_implements<T: CovarianceTracer>(
        &mut self,
        class: &'a ClassType,
        target: &str,
        tracer: &mut T,
    ) -> bool {
        let resolver = self.resolver;
        self.chain.clear();
        let mut current = class;

        loop {
            if !self.enter_chain(current, tracer) {
                return false;
            }
            if self.any_interface_reaches(&current.interfaces, target, tracer) {
                return true;
            }
            let Some(base) = current.base.as_deref() else {
                return false;
            };
            match resolver.resolve(base) {
                Some(TypeDef::Class(base_class)) => current = base_class,
                Some(_) => return false,
                None => {
                    tracer.on_mismatch(|| CovarianceFailureReason::UnresolvedType {
                        fqn: base.to_string(),
                    });
                    return false;
                }
            }
        }
    }

    /// Record `class` on the base chain. Seeing it twice is a cycle.
    fn enter_chain<T: CovarianceTracer>(&mut self, class: &'a ClassType, tracer: &mut T) -> bool {
        if self.chain.insert(class.fqn.as_str()) {
            return true;
        }
        trace!(fqn = %class.fqn, "inheritance cycle");
        tracer.on_mismatch(|| CovarianceFailureReason::InheritanceCycle {
            fqn: class.fqn.clone(),
        });
        false
    }

    /// Enter `fqn` on the walk path. A denied entry is reported and treated as
    /// "not found" by the caller.
    fn enter<T: CovarianceTracer>(&mut self, fqn: &'a str, tracer: &mut T) -> bool {
        match self.guard.enter(fqn) {
            RecursionResult::Entered => true,
            RecursionResult::Cycle => {
                trace!(fqn, "inheritance cycle");
                tracer.on_mismatch(|| CovarianceFailureReason::InheritanceCycle {
                    fqn: fqn.to_string(),
                });
                false
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                trace!(fqn, "inheritance walk limit exceeded");
                tracer.on_mismatch(|| CovarianceFailureReason::WalkLimitExceeded {
                    at: fqn.to_string(),
                });
                false
            }
        }
    }
}

/// Whether `subtype` may replace `supertype` at an overriding declaration.
///
/// `None` stands for void. Pure, total and deterministic: every input produces
/// a boolean.
pub fn is_allowed_covariant_subtype<R: TypeResolver + ?Sized>(
    subtype: Option<&TypeReference>,
    supertype: Option<&TypeReference>,
    resolver: &R,
) -> bool {
    CovarianceChecker::new(resolver).is_allowed(subtype, supertype)
}

/// Like [`is_allowed_covariant_subtype`], with the reasons for a rejection.
pub fn explain_covariance<R: TypeResolver + ?Sized>(
    subtype: Option<&TypeReference>,
    supertype: Option<&TypeReference>,
    resolver: &R,
) -> CovarianceExplanation {
    CovarianceChecker::new(resolver).explain(subtype, supertype)
}

#[cfg(test)]
#[path = "../tests/covariance_tests.rs"]
mod tests;
