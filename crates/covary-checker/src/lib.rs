//! Override checking for covary.
//!
//! Two layers sit on top of the covariance engine in `covary-solver`:
//!
//! - **Policy** ([`policy`]): which override sites may narrow a type at all
//!   (output positions of immutable, non-static members overriding a base
//!   class), with interface covariance behind a flag
//! - **Override checker** ([`override_checker`]): discovers the override
//!   pairs of an assembly, validates each against the policy and produces
//!   diagnostics and override metadata

pub mod override_checker;
pub mod policy;

pub use override_checker::{
    CheckResult, OverrideChecker, OverrideInfo, check_assembly, member_location,
};
pub use policy::{
    DeclaringKind, MemberPosition, OverrideOrigin, OverridePolicy, OverrideSite, OverrideVerdict,
    VarianceRule,
};
