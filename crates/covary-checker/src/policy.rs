//! Call-site policy for covariant overrides.
//!
//! The covariance engine answers "is this narrowing sound?" for any pair of
//! references. Whether an override site may use that answer at all is decided
//! here:
//!
//! - method parameters are invariant (neither covariant nor contravariant)
//! - mutable properties are invariant
//! - static members are invariant
//! - members that implement or extend an interface declaration are invariant
//!   unless [`OverridePolicy::allow_interface_covariance`] is set
//!
//! Everything else (immutable property reads and method returns overriding a
//! base-class declaration) is checked with the covariance engine.

use covary_solver::{CovarianceFailureReason, TypeReference, TypeResolver, explain_covariance};
use serde::Serialize;
use std::fmt;
use tracing::trace;

/// Where the overriding type appears in the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberPosition {
    PropertyRead,
    MethodReturn,
    MethodParameter,
}

/// What kind of declaration is being overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideOrigin {
    BaseClass,
    Interface,
}

/// Kind of the type declaring the overriding member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaringKind {
    Class,
    Interface,
}

/// One override site, reduced to what the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverrideSite {
    pub position: MemberPosition,
    /// Read-only property. Always `true` for method positions.
    pub immutable: bool,
    pub is_static: bool,
    pub origin: OverrideOrigin,
    pub declared_on: DeclaringKind,
}

impl OverrideSite {
    pub fn property(
        immutable: bool,
        is_static: bool,
        origin: OverrideOrigin,
        declared_on: DeclaringKind,
    ) -> Self {
        Self {
            position: MemberPosition::PropertyRead,
            immutable,
            is_static,
            origin,
            declared_on,
        }
    }

    pub fn method_return(
        is_static: bool,
        origin: OverrideOrigin,
        declared_on: DeclaringKind,
    ) -> Self {
        Self {
            position: MemberPosition::MethodReturn,
            immutable: true,
            is_static,
            origin,
            declared_on,
        }
    }

    pub fn method_parameter(
        is_static: bool,
        origin: OverrideOrigin,
        declared_on: DeclaringKind,
    ) -> Self {
        Self {
            position: MemberPosition::MethodParameter,
            immutable: true,
            is_static,
            origin,
            declared_on,
        }
    }

    fn involves_interface(&self) -> bool {
        self.origin == OverrideOrigin::Interface || self.declared_on == DeclaringKind::Interface
    }
}

/// How an overriding type must relate to the overridden one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceRule {
    /// Structural equality only.
    Exact,
    /// Equality, or a narrowing accepted by the covariance engine.
    Covariant,
}

impl fmt::Display for VarianceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VarianceRule::Exact => "exact",
            VarianceRule::Covariant => "covariant",
        })
    }
}

/// Outcome of checking one override site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum OverrideVerdict {
    /// The two types are structurally equal.
    Identical,
    /// A narrowing the site is allowed to use.
    CovariantNarrowing,
    Rejected {
        rule: VarianceRule,
        /// Why the engine rejected the narrowing. Empty when the engine would
        /// have accepted it but the site requires an exact match.
        reasons: Vec<CovarianceFailureReason>,
    },
}

impl OverrideVerdict {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, OverrideVerdict::Rejected { .. })
    }

    #[inline]
    pub fn is_covariant(&self) -> bool {
        matches!(self, OverrideVerdict::CovariantNarrowing)
    }
}

/// Policy switches for override checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverridePolicy {
    /// Let interface implementations and interface extensions narrow output
    /// types. Off by default: not every target language accepts a covariant
    /// override of an interface member.
    pub allow_interface_covariance: bool,
}

impl OverridePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow_interface_covariance(mut self, allow: bool) -> Self {
        self.allow_interface_covariance = allow;
        self
    }

    /// The variance rule that applies at `site`.
    pub fn rule_for(&self, site: &OverrideSite) -> VarianceRule {
        if site.position == MemberPosition::MethodParameter || !site.immutable || site.is_static {
            return VarianceRule::Exact;
        }
        if site.involves_interface() && !self.allow_interface_covariance {
            return VarianceRule::Exact;
        }
        VarianceRule::Covariant
    }

    /// Check an overriding type against the overridden one. `None` is void.
    pub fn check<R: TypeResolver + ?Sized>(
        &self,
        site: &OverrideSite,
        subtype: Option<&TypeReference>,
        supertype: Option<&TypeReference>,
        resolver: &R,
    ) -> OverrideVerdict {
        if subtype == supertype {
            return OverrideVerdict::Identical;
        }

        let rule = self.rule_for(site);
        let explanation = explain_covariance(subtype, supertype, resolver);
        trace!(?site, %rule, allowed = explanation.allowed, "override site");

        match rule {
            VarianceRule::Covariant if explanation.allowed => OverrideVerdict::CovariantNarrowing,
            rule => OverrideVerdict::Rejected {
                rule,
                reasons: explanation.reasons,
            },
        }
    }
}

#[cfg(test)]
#[path = "../tests/policy_tests.rs"]
mod tests;
