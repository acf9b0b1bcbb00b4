use colored::Colorize;

use crate::driver::{CheckOutcome, QueryOutcome};
use covary_common::{Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation};

/// Renders diagnostics and query answers as text.
pub struct Reporter {
    color: bool,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter { color }
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            out.push_str(&self.format_diagnostic(diagnostic));
            out.push('\n');
        }
        out
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        output.push_str(&self.format_location(&diagnostic.location));
        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        let code = self.format_code(diagnostic.code);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        for related in &diagnostic.related_information {
            output.push('\n');
            output.push_str(&self.format_related(related));
        }
        output
    }

    /// Full report for a checked assembly, ending in a summary line.
    pub fn render_outcome(&self, outcome: &CheckOutcome) -> String {
        let mut out = self.render(&outcome.result.diagnostics);
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.format_summary(outcome));
        out.push('\n');
        out
    }

    pub fn render_query(&self, outcome: &QueryOutcome) -> String {
        let verdict = if outcome.explanation.allowed {
            self.paint("allowed", |s| s.green().bold().to_string())
        } else {
            self.paint("rejected", |s| s.red().bold().to_string())
        };
        let mut out = format!("{} -> {}: {verdict}\n", outcome.subtype, outcome.supertype);
        for reason in &outcome.explanation.reasons {
            out.push_str("  ");
            out.push_str(&reason.to_string());
            out.push('\n');
        }
        out
    }

    fn format_summary(&self, outcome: &CheckOutcome) -> String {
        let overrides = outcome.result.overrides.len();
        let covariant = outcome.result.overrides.iter().filter(|o| o.covariant).count();
        let checked = format!(
            "Checked {}: {overrides} override(s), {covariant} covariant.",
            outcome.assembly
        );
        match outcome.error_count {
            0 => checked,
            1 => format!("{checked} {}", self.paint("Found 1 error.", |s| s.red().to_string())),
            n => format!(
                "{checked} {}",
                self.paint(&format!("Found {n} errors."), |s| s.red().to_string())
            ),
        }
    }

    fn format_related(&self, related: &DiagnosticRelatedInformation) -> String {
        format!(
            "    {}: {}",
            self.format_location(&related.location),
            related.message_text
        )
    }

    fn format_location(&self, location: &str) -> String {
        self.paint(location, |s| s.cyan().to_string())
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.to_string();
        if !self.color {
            return label;
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }

        let label = format!("CV{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }

    fn paint(&self, text: &str, style: impl FnOnce(&str) -> String) -> String {
        if self.color {
            style(text)
        } else {
            text.to_string()
        }
    }
}
