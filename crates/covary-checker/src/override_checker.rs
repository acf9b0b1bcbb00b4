//! Assembly-level override checking.
//!
//! For every class and interface in the local assembly, pairs each declared
//! member with the declarations it overrides or implements and validates the
//! override contract:
//!
//! - class members against the nearest base-class declaration of the same
//!   name, then against every interface reachable from the class and its bases
//! - interface members against every super-interface declaration
//!
//! Type comparisons go through [`OverridePolicy`], which decides whether a site
//! may narrow at all before asking the covariance engine. Everything that
//! cannot be resolved is reported; the checker never assumes compatibility.

use crate::policy::{DeclaringKind, OverrideOrigin, OverridePolicy, OverrideSite, OverrideVerdict};
use covary_common::diagnostics::diagnostic_messages;
use covary_common::limits::MAX_RELATED_INFORMATION;
use covary_common::{
    Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation, diagnostic_codes, format_message,
};
use covary_solver::{
    Ancestors, Assembly, AssemblyResolver, CovarianceFailureReason, DependencyClosure, Member,
    Method, Property, TypeDef, TypeReference, TypeResolver, collect_ancestors, render,
    render_optional,
};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{debug, debug_span};

/// `<fqn>#<member>`.
pub fn member_location(type_fqn: &str, member: &str) -> String {
    format!("{type_fqn}#{member}")
}

/// A validated override, for attaching override metadata to the member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideInfo {
    /// Type declaring the overriding member.
    pub type_fqn: String,
    pub member: String,
    /// Type declaring the overridden member.
    pub overrides: String,
    /// At least one type was narrowed covariantly.
    pub covariant: bool,
}

/// Diagnostics and validated overrides, in assembly declaration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub overrides: Vec<OverrideInfo>,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    fn append(&mut self, other: CheckResult) {
        self.diagnostics.extend(other.diagnostics);
        self.overrides.extend(other.overrides);
    }
}

/// One member paired with a declaration it overrides.
#[derive(Clone, Copy)]
struct OverridePair<'m> {
    type_fqn: &'m str,
    member: Member<'m>,
    owner_fqn: &'m str,
    overridden: Member<'m>,
    origin: OverrideOrigin,
    declared_on: DeclaringKind,
}

impl OverridePair<'_> {
    fn location(&self) -> String {
        member_location(self.type_fqn, self.member.name())
    }

    fn overridden_location(&self) -> String {
        member_location(self.owner_fqn, self.overridden.name())
    }
}

/// Checks every override in one assembly.
pub struct OverrideChecker<'a> {
    resolver: AssemblyResolver<'a>,
    policy: OverridePolicy,
}

impl<'a> OverrideChecker<'a> {
    pub fn new(
        assembly: &'a Assembly,
        closure: &'a DependencyClosure,
        policy: OverridePolicy,
    ) -> Self {
        Self {
            resolver: AssemblyResolver::new(assembly, closure),
            policy,
        }
    }

    pub fn policy(&self) -> OverridePolicy {
        self.policy
    }

    pub fn resolver(&self) -> &AssemblyResolver<'a> {
        &self.resolver
    }

    /// Check every type of the assembly. Types are checked in parallel; the
    /// result keeps declaration order.
    pub fn check_assembly(&self) -> CheckResult {
        let assembly = self.resolver.assembly();
        let _span = debug_span!(
            "check_assembly",
            assembly = %assembly.name,
            types = assembly.types.len()
        )
        .entered();

        let defs: Vec<&TypeDef> = assembly.types.values().collect();
        let per_type: Vec<CheckResult> = defs.par_iter().map(|def| self.check_type(def)).collect();

        let mut result = CheckResult::default();
        for checked in per_type {
            result.append(checked);
        }
        debug!(
            diagnostics = result.diagnostics.len(),
            overrides = result.overrides.len(),
            "assembly checked"
        );
        result
    }

    /// Check the members of one type against everything it inherits.
    pub fn check_type(&self, def: &TypeDef) -> CheckResult {
        let mut out = CheckResult::default();
        let declared_on = match def {
            TypeDef::Class(_) => DeclaringKind::Class,
            TypeDef::Interface(_) => DeclaringKind::Interface,
            TypeDef::Enum(_) => return out,
        };

        let ancestors = collect_ancestors(&self.resolver, def);
        self.report_incomplete_ancestors(def.fqn(), &ancestors, &mut out);

        for member in def.members() {
            let name = member.name();
            self.check_member_types(def.fqn(), member, &mut out);

            let base_declaration = ancestors
                .base_declaring(name)
                .and_then(|base| Some((base.fqn.as_str(), base.member(name)?)));
            if let Some((owner_fqn, overridden)) = base_declaration {
                self.check_override(
                    OverridePair {
                        type_fqn: def.fqn(),
                        member,
                        owner_fqn,
                        overridden,
                        origin: OverrideOrigin::BaseClass,
                        declared_on,
                    },
                    &mut out,
                );
            }

            for iface in ancestors.interfaces_declaring(name) {
                let Some(overridden) = iface.member(name) else {
                    continue;
                };
                self.check_override(
                    OverridePair {
                        type_fqn: def.fqn(),
                        member,
                        owner_fqn: &iface.fqn,
                        overridden,
                        origin: OverrideOrigin::Interface,
                        declared_on,
                    },
                    &mut out,
                );
            }
        }

        out
    }

    fn report_incomplete_ancestors(
        &self,
        type_fqn: &str,
        ancestors: &Ancestors<'_>,
        out: &mut CheckResult,
    ) {
        let mut seen = FxHashSet::default();
        for &fqn in &ancestors.unresolved {
            if seen.insert(fqn) {
                out.diagnostics.push(Diagnostic::from_code(
                    type_fqn,
                    diagnostic_codes::UNRESOLVED_TYPE_REFERENCE,
                    &[fqn, type_fqn],
                ));
            }
        }

        let walk_failures = [
            (diagnostic_codes::INHERITANCE_CYCLE, &ancestors.cycles),
            (
                diagnostic_codes::INHERITANCE_WALK_LIMIT_EXCEEDED,
                &ancestors.limit_exceeded,
            ),
        ];
        for (code, fqns) in walk_failures {
            seen.clear();
            for &fqn in fqns {
                if seen.insert(fqn) {
                    out.diagnostics
                        .push(Diagnostic::from_code(type_fqn, code, &[type_fqn, fqn]));
                }
            }
        }
    }

    /// Every named type a member mentions must resolve.
    fn check_member_types(&self, type_fqn: &str, member: Member<'_>, out: &mut CheckResult) {
        let mut refs: SmallVec<[&TypeReference; 4]> = SmallVec::new();
        match member {
            Member::Property(property) => refs.push(&property.type_ref),
            Member::Method(method) => {
                refs.extend(method.return_type());
                refs.extend(method.parameters.iter().map(|p| &p.type_ref));
            }
        }

        let location = member_location(type_fqn, member.name());
        let mut seen = FxHashSet::default();
        for type_ref in refs {
            type_ref.for_each_fqn(&mut |fqn| {
                if self.resolver.resolve(fqn).is_none() && seen.insert(fqn) {
                    out.diagnostics.push(Diagnostic::from_code(
                        location.as_str(),
                        diagnostic_codes::UNRESOLVED_TYPE_REFERENCE,
                        &[fqn, &location],
                    ));
                }
            });
        }
    }

    fn check_override(&self, pair: OverridePair<'_>, out: &mut CheckResult) {
        let location = pair.location();
        let overridden = pair.overridden_location();
        let mut diagnostics = Vec::new();
        let mut covariant = false;

        match (pair.member, pair.overridden) {
            (Member::Property(sub), Member::Property(sup)) => {
                self.check_static(&pair, &mut diagnostics);
                covariant = self.check_property(&pair, sub, sup, &mut diagnostics);
            }
            (Member::Method(sub), Member::Method(sup)) => {
                self.check_static(&pair, &mut diagnostics);
                covariant = self.check_method(&pair, sub, sup, &mut diagnostics);
            }
            (sub, sup) => diagnostics.push(self.override_error(
                &pair,
                diagnostic_codes::MEMBER_KIND_CHANGED,
                &[&location, sub.kind_name(), &overridden, sup.kind_name()],
                &[],
            )),
        }

        debug!(
            member = %location,
            overrides = %overridden,
            origin = ?pair.origin,
            violations = diagnostics.len(),
            covariant,
            "override checked"
        );

        if diagnostics.is_empty() {
            out.overrides.push(OverrideInfo {
                type_fqn: pair.type_fqn.to_string(),
                member: pair.member.name().to_string(),
                overrides: pair.owner_fqn.to_string(),
                covariant,
            });
        } else {
            out.diagnostics.extend(diagnostics);
        }
    }

    fn check_static(&self, pair: &OverridePair<'_>, diagnostics: &mut Vec<Diagnostic>) {
        if pair.member.is_static() != pair.overridden.is_static() {
            diagnostics.push(self.override_error(
                pair,
                diagnostic_codes::STATIC_MODIFIER_CHANGED,
                &[&pair.location(), &pair.overridden_location()],
                &[],
            ));
        }
    }

    /// Returns whether the property type was narrowed.
    fn check_property(
        &self,
        pair: &OverridePair<'_>,
        sub: &Property,
        sup: &Property,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        let location = pair.location();
        let overridden = pair.overridden_location();

        if sub.optional != sup.optional {
            diagnostics.push(self.override_error(
                pair,
                diagnostic_codes::PROPERTY_OPTIONALITY_CHANGED,
                &[&location, &overridden],
                &[],
            ));
        }
        if sub.immutable != sup.immutable {
            diagnostics.push(self.override_error(
                pair,
                diagnostic_codes::PROPERTY_MUTABILITY_CHANGED,
                &[&location, &overridden],
                &[],
            ));
        }

        let site =
            OverrideSite::property(sub.immutable, sub.is_static, pair.origin, pair.declared_on);
        let verdict = self
            .policy
            .check(&site, Some(&sub.type_ref), Some(&sup.type_ref), &self.resolver);
        if let OverrideVerdict::Rejected { reasons, .. } = &verdict {
            diagnostics.push(self.override_error(
                pair,
                diagnostic_codes::PROPERTY_TYPE_NOT_COMPATIBLE,
                &[&render(&sub.type_ref), &location, &render(&sup.type_ref), &overridden],
                reasons,
            ));
        }
        verdict.is_covariant()
    }

    /// Returns whether the return type was narrowed.
    fn check_method(
        &self,
        pair: &OverridePair<'_>,
        sub: &Method,
        sup: &Method,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        let location = pair.location();
        let overridden = pair.overridden_location();

        if sub.parameters.len() != sup.parameters.len() {
            diagnostics.push(self.override_error(
                pair,
                diagnostic_codes::PARAMETER_COUNT_CHANGED,
                &[
                    &location,
                    &sub.parameters.len().to_string(),
                    &overridden,
                    &sup.parameters.len().to_string(),
                ],
                &[],
            ));
        } else {
            let site = OverrideSite::method_parameter(sub.is_static, pair.origin, pair.declared_on);
            for (param, base_param) in sub.parameters.iter().zip(&sup.parameters) {
                if param.optional != base_param.optional {
                    diagnostics.push(self.override_error(
                        pair,
                        diagnostic_codes::PARAMETER_OPTIONALITY_CHANGED,
                        &[&param.name, &location, &overridden],
                        &[],
                    ));
                }
                if param.variadic != base_param.variadic {
                    diagnostics.push(self.override_error(
                        pair,
                        diagnostic_codes::PARAMETER_VARIADIC_CHANGED,
                        &[&param.name, &location, &overridden],
                        &[],
                    ));
                }
                let verdict = self.policy.check(
                    &site,
                    Some(&param.type_ref),
                    Some(&base_param.type_ref),
                    &self.resolver,
                );
                if !verdict.is_accepted() {
                    diagnostics.push(self.override_error(
                        pair,
                        diagnostic_codes::PARAMETER_TYPE_CHANGED,
                        &[
                            &param.name,
                            &location,
                            &render(&param.type_ref),
                            &overridden,
                            &render(&base_param.type_ref),
                        ],
                        &[],
                    ));
                }
            }
        }

        if let (Some(ret), Some(base_ret)) = (&sub.returns, &sup.returns)
            && ret.optional != base_ret.optional
        {
            diagnostics.push(self.override_error(
                pair,
                diagnostic_codes::RETURN_OPTIONALITY_CHANGED,
                &[&location, &overridden],
                &[],
            ));
        }

        let site = OverrideSite::method_return(sub.is_static, pair.origin, pair.declared_on);
        let verdict = self
            .policy
            .check(&site, sub.return_type(), sup.return_type(), &self.resolver);
        if let OverrideVerdict::Rejected { reasons, .. } = &verdict {
            diagnostics.push(self.override_error(
                pair,
                diagnostic_codes::RETURN_TYPE_NOT_COMPATIBLE,
                &[
                    &render_optional(sub.return_type()),
                    &location,
                    &render_optional(sup.return_type()),
                    &overridden,
                ],
                reasons,
            ));
        }
        verdict.is_covariant()
    }

    /// An error at the overriding member, pointing at the overridden
    /// declaration and carrying the engine's reasons.
    fn override_error(
        &self,
        pair: &OverridePair<'_>,
        code: u32,
        args: &[&str],
        reasons: &[CovarianceFailureReason],
    ) -> Diagnostic {
        let location = pair.location();
        let overridden = pair.overridden_location();
        let mut diag = Diagnostic::from_code(location.as_str(), code, args);
        diag.related_information.push(DiagnosticRelatedInformation {
            message_text: format_message(
                diagnostic_messages::OVERRIDDEN_DECLARATION_IS_HERE,
                &[&overridden],
            ),
            location: overridden,
            category: DiagnosticCategory::Message,
            code: diagnostic_codes::OVERRIDDEN_DECLARATION_IS_HERE,
        });
        for reason in reasons.iter().take(MAX_RELATED_INFORMATION) {
            diag = diag.with_related(location.as_str(), reason.to_string());
        }
        diag
    }
}

/// Check `assembly` against its dependency closure.
pub fn check_assembly(
    assembly: &Assembly,
    closure: &DependencyClosure,
    policy: OverridePolicy,
) -> CheckResult {
    OverrideChecker::new(assembly, closure, policy).check_assembly()
}
