//! Common types and utilities for the covary override checker.
//!
//! This crate provides foundational pieces used across all covary crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, message templates and codes)
//! - Centralized limits for inheritance walks and type-reference nesting

// Diagnostic types, message data and formatting helpers
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticMessage, DiagnosticRelatedInformation,
    diagnostic_codes, format_message, get_diagnostic_category, get_diagnostic_message,
    get_message_template,
};

// Centralized limits and thresholds
pub mod limits;
