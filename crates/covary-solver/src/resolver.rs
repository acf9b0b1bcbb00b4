//! Named type resolution across assembly boundaries.
//!
//! A resolver maps an fqn to its [`TypeDef`]. The owning assembly is the first
//! segment of the fqn: references into the local assembly are looked up in its
//! type map, anything else is looked up in the dependency closure.
//!
//! Resolution failure is a normal outcome (ambient or external declarations are
//! not part of any closure). Callers treat `None` as "incompatible", never as
//! "assume compatible".

use crate::assembly::{Assembly, DependencyClosure, TypeDef, assembly_name_of};
use crate::types::TypeReference;
use tracing::trace;

/// Looks up named type definitions by fqn.
///
/// Implementations must be pure lookups over immutable data: the covariance
/// engine may call them any number of times, from any thread, in any order.
pub trait TypeResolver {
    fn resolve(&self, fqn: &str) -> Option<&TypeDef>;

    /// Resolve a type reference if it is a named reference.
    fn resolve_reference(&self, type_ref: &TypeReference) -> Option<&TypeDef> {
        type_ref.as_named().and_then(|fqn| self.resolve(fqn))
    }
}

impl<T: TypeResolver + ?Sized> TypeResolver for &T {
    #[inline]
    fn resolve(&self, fqn: &str) -> Option<&TypeDef> {
        (**self).resolve(fqn)
    }
}

/// Resolver that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl TypeResolver for NoopResolver {
    fn resolve(&self, _fqn: &str) -> Option<&TypeDef> {
        None
    }
}

/// A single assembly resolves only its own types.
impl TypeResolver for Assembly {
    fn resolve(&self, fqn: &str) -> Option<&TypeDef> {
        if assembly_name_of(fqn) == self.name {
            self.get(fqn)
        } else {
            None
        }
    }
}

/// Resolver over one assembly and its dependency closure.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyResolver<'a> {
    assembly: &'a Assembly,
    closure: &'a DependencyClosure,
}

impl<'a> AssemblyResolver<'a> {
    pub fn new(assembly: &'a Assembly, closure: &'a DependencyClosure) -> Self {
        Self { assembly, closure }
    }

    pub fn assembly(&self) -> &'a Assembly {
        self.assembly
    }

    pub fn closure(&self) -> &'a DependencyClosure {
        self.closure
    }

    /// Like [`TypeResolver::resolve`] but with the borrow tied to the
    /// underlying assembly data instead of `self`.
    pub fn lookup(&self, fqn: &str) -> Option<&'a TypeDef> {
        let owner = assembly_name_of(fqn);
        let found = if owner == self.assembly.name {
            self.assembly.get(fqn)
        } else {
            self.closure.find(owner).and_then(|dep| dep.get(fqn))
        };
        if found.is_none() {
            trace!(fqn, owner, "type not found");
        }
        found
    }
}

impl TypeResolver for AssemblyResolver<'_> {
    #[inline]
    fn resolve(&self, fqn: &str) -> Option<&TypeDef> {
        self.lookup(fqn)
    }
}

/// Build a resolver for `assembly` and its dependency closure.
pub fn make_resolver<'a>(
    assembly: &'a Assembly,
    closure: &'a DependencyClosure,
) -> AssemblyResolver<'a> {
    AssemblyResolver::new(assembly, closure)
}

#[cfg(test)]
#[path = "../tests/resolver_tests.rs"]
mod tests;
