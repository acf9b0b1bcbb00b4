//! Diagnostic types and message lookup for the override checker.
//!
//! Message templates and codes live in `data.rs`. Templates use `{0}`, `{1}`,
//! ... placeholders that are filled in with [`format_message`].

use serde::Serialize;
use std::fmt;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Suggestion => "suggestion",
            Self::Message => "message",
        };
        f.write_str(label)
    }
}

/// Related information for a diagnostic (e.g., the overridden declaration).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticRelatedInformation {
    /// Member location in `<fqn>#<member>` form, or a bare fqn.
    pub location: String,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// An override-checking diagnostic with optional related information.
///
/// Locations are model locations, not source spans: the checker only sees the
/// interchange model, so `location` names the declaring type and member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub location: String,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// An error with a free-form message.
    #[must_use]
    pub fn error(location: impl Into<String>, message: impl Into<String>, code: u32) -> Self {
        Self {
            location: location.into(),
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic from a registered code, filling in its template.
    ///
    /// Unknown codes produce an error whose text is the joined arguments, so a
    /// missing table entry never swallows a failure.
    #[must_use]
    pub fn from_code(location: impl Into<String>, code: u32, args: &[&str]) -> Self {
        let (category, message_text) = match get_diagnostic_message(code) {
            Some(def) => (def.category, format_message(def.message, args)),
            None => (DiagnosticCategory::Error, args.join(" ")),
        };
        Self {
            location: location.into(),
            message_text,
            category,
            code,
            related_information: Vec::new(),
        }
    }

    /// Attach a pointer to another location, such as the overridden member.
    #[must_use]
    pub fn with_related(mut self, location: impl Into<String>, message: impl Into<String>) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            location: location.into(),
            message_text: message.into(),
            category: DiagnosticCategory::Message,
            code: 0,
        });
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} CV{}: {}",
            self.location, self.category, self.code, self.message_text
        )
    }
}

/// Substitute `{0}`, `{1}`, ... in `template`.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// One row of the message table.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Table lookup by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

#[must_use]
pub fn get_diagnostic_category(code: u32) -> Option<DiagnosticCategory> {
    get_diagnostic_message(code).map(|m| m.category)
}

#[cfg(test)]
#[path = "../../tests/diagnostics_tests.rs"]
mod tests;
