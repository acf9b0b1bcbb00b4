//! Ancestor collection for override discovery.
//!
//! The override checker needs, for a class or interface, the ordered list of
//! base classes (nearest first) and every interface reachable from the type
//! and its bases. This module computes that once per type.
//!
//! Note: the walk is guarded the same way the covariance engine is. The base
//! chain is followed iteratively and is bounded only by the set of classes
//! already on it; super-interfaces are walked depth-first under a
//! [`RecursionGuard`]. A cyclic graph is recorded in [`Ancestors::cycles`] and
//! cut at the point of re-entry, an interface graph nested past the guard's
//! limits is recorded in [`Ancestors::limit_exceeded`], and unresolvable fqns
//! are recorded in [`Ancestors::unresolved`].

use crate::assembly::{ClassType, InterfaceType, TypeDef};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::resolver::TypeResolver;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::debug;

/// Everything a type inherits from.
#[derive(Debug, Default)]
pub struct Ancestors<'a> {
    /// Base classes, nearest first. Empty for interfaces.
    pub bases: SmallVec<[&'a ClassType; 8]>,
    /// Reachable interfaces, deduplicated, in depth-first discovery order:
    /// the type's own interfaces (and their supers) before its bases'.
    pub interfaces: Vec<&'a InterfaceType>,
    /// Referenced fqns that did not resolve.
    pub unresolved: Vec<&'a str>,
    /// fqns at which the walk re-entered a type already on its path.
    pub cycles: Vec<&'a str>,
    /// fqns at which the interface walk ran out of depth or iterations.
    pub limit_exceeded: Vec<&'a str>,
}

impl<'a> Ancestors<'a> {
    /// The nearest base class declaring a member called `name`.
    pub fn base_declaring(&self, name: &str) -> Option<&'a ClassType> {
        self.bases.iter().copied().find(|base| base.member(name).is_some())
    }

    /// Every reachable interface declaring a member called `name`.
    pub fn interfaces_declaring<'s>(
        &'s self,
        name: &'s str,
    ) -> impl Iterator<Item = &'a InterfaceType> + 's {
        self.interfaces
            .iter()
            .copied()
            .filter(move |iface| iface.member(name).is_some())
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty() && self.cycles.is_empty() && self.limit_exceeded.is_empty()
    }
}

/// Collect the ancestors of `def`. Enums have none.
pub fn collect_ancestors<'a, R: TypeResolver + ?Sized>(
    resolver: &'a R,
    def: &'a TypeDef,
) -> Ancestors<'a> {
    let mut walker = AncestorWalker {
        resolver,
        guard: RecursionGuard::with_profile(RecursionProfile::InheritanceWalk),
        chain: FxHashSet::default(),
        seen_interfaces: FxHashSet::default(),
        out: Ancestors::default(),
    };

    match def {
        TypeDef::Class(class) => walker.walk_class(class),
        TypeDef::Interface(iface) => {
            walker.seen_interfaces.insert(iface.fqn.as_str());
            if walker.enter(&iface.fqn) {
                walker.walk_interfaces(&iface.interfaces);
                walker.guard.leave(iface.fqn.as_str());
            }
        }
        TypeDef::Enum(_) => {}
    }

    if !walker.out.is_complete() {
        debug!(
            fqn = def.fqn(),
            unresolved = walker.out.unresolved.len(),
            cycles = walker.out.cycles.len(),
            limit_exceeded = walker.out.limit_exceeded.len(),
            "incomplete ancestor walk"
        );
    }
    walker.out
}

struct AncestorWalker<'a, R: TypeResolver + ?Sized> {
    resolver: &'a R,
    guard: RecursionGuard<&'a str>,
    /// Classes already on the base chain.
    chain: FxHashSet<&'a str>,
    seen_interfaces: FxHashSet<&'a str>,
    out: Ancestors<'a>,
}

impl<'a, R: TypeResolver + ?Sized> AncestorWalker<'a, R> {
    fn enter(&mut self, fqn: &'a str) -> bool {
        match self.guard.enter(fqn) {
            RecursionResult::Entered => true,
            RecursionResult::Cycle => {
                self.out.cycles.push(fqn);
                false
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                self.out.limit_exceeded.push(fqn);
                false
            }
        }
    }

    fn walk_class(&mut self, class: &'a ClassType) {
        let resolver = self.resolver;
        let mut current = class;
        self.chain.insert(current.fqn.as_str());

        loop {
            self.walk_interfaces(&current.interfaces);

            let Some(base) = current.base.as_deref() else {
                return;
            };
            match resolver.resolve(base) {
                Some(TypeDef::Class(base_class)) => {
                    if !self.chain.insert(base_class.fqn.as_str()) {
                        self.out.cycles.push(base_class.fqn.as_str());
                        return;
                    }
                    self.out.bases.push(base_class);
                    current = base_class;
                }
                Some(_) => return,
                None => {
                    self.out.unresolved.push(base);
                    return;
                }
            }
        }
    }

    fn walk_interfaces(&mut self, interfaces: &'a [String]) {
        let resolver = self.resolver;
        for fqn in interfaces {
            if self.guard.is_visiting(&fqn.as_str()) {
                self.out.cycles.push(fqn);
                continue;
            }
            if !self.seen_interfaces.insert(fqn.as_str()) {
                continue;
            }
            match resolver.resolve(fqn) {
                Some(TypeDef::Interface(iface)) => {
                    self.out.interfaces.push(iface);
                    if self.enter(&iface.fqn) {
                        self.walk_interfaces(&iface.interfaces);
                        self.guard.leave(iface.fqn.as_str());
                    }
                }
                Some(_) => {}
                None => self.out.unresolved.push(fqn),
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod tests;
