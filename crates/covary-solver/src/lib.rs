//! Cross-language covariance solver.
//!
//! This crate implements the pure decision procedure behind override checking:
//!
//! - **Type reference model** ([`types`]): the closed set of structural type
//!   shapes, structural equality and canonical rendering ([`format`])
//! - **Interchange model** ([`assembly`]): named type definitions, members,
//!   assemblies and dependency closures, in the shared JSON schema
//! - **Resolver** ([`resolver`]): fqn lookup across assembly boundaries
//! - **Covariance engine** ([`covariance`]): may a member's type be narrowed
//!   at an overriding declaration under the least permissive target language?
//! - **Hierarchy** ([`hierarchy`]): ancestor collection for override discovery
//!
//! Everything here is synchronous and side-effect free. Assemblies are
//! immutable for the duration of a check, so resolvers and queries can run
//! concurrently from many override sites without synchronization.
//!
//! Call-site policy (which members may use a covariant answer at all) lives in
//! `covary-checker`, not here.

pub mod assembly;
pub mod covariance;
mod format;
pub mod hierarchy;
pub mod recursion;
pub mod resolver;
pub mod types;

pub use assembly::{
    Assembly, ClassType, DependencyClosure, EnumMember, EnumType, FQN_SEPARATOR, InterfaceType,
    Member, Method, Parameter, Property, ReturnValue, TypeDef, TypeKind, assembly_name_of,
};
pub use covariance::{
    CovarianceChecker, CovarianceExplanation, CovarianceFailureReason, CovarianceTracer,
    DiagnosticTracer, FastTracer, VoidSide, explain_covariance, is_allowed_covariant_subtype,
};
pub use format::{render, render_optional};
pub use hierarchy::{Ancestors, collect_ancestors};
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use resolver::{AssemblyResolver, NoopResolver, TypeResolver, make_resolver};
pub use types::{
    CollectionKind, CollectionType, IntersectionType, PrimitiveType, TypeReference, UnionType,
};

#[cfg(test)]
#[path = "../tests/concurrency_tests.rs"]
mod concurrency_tests;

#[cfg(test)]
#[path = "../tests/test_fixtures.rs"]
pub(crate) mod test_fixtures;
