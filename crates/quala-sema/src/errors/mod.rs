// errors/mod.rs
//! Qualifier diagnostics and the sink they are reported through.
//!
//! Severity is chosen by the policy at runtime, so `QualifierDiagnostic`
//! implements `miette::Diagnostic` by hand instead of deriving it.

#![allow(unused_assignments)] // False positives from thiserror derive

pub mod report;

use std::fmt;

use miette::{Diagnostic, LabeledSpan};
use quala_frontend::Span;
use thiserror::Error;

/// Stable codes for diagnostics raised by the engine itself.
pub mod codes {
    /// Default message for a failed `Policy::compatible`.
    pub const INCOMPATIBLE: &str = "Q0001";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

impl From<Severity> for miette::Severity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        }
    }
}

/// A policy violation at one source range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct QualifierDiagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Span,
    /// Text shown under the highlighted range.
    pub label: Option<String>,
    pub help: Option<String>,
}

impl QualifierDiagnostic {
    pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            span: Span::default(),
            label: None,
            help: None,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Diagnostic for QualifierDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity.into())
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = LabeledSpan::new_with_span(self.label.clone(), self.span);
        Some(Box::new(std::iter::once(span)))
    }
}

/// Receives diagnostics as the checker finds them.
///
/// Diagnostics are additive: a sink sees every violation, in traversal
/// order, with no deduplication.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: QualifierDiagnostic);
}

impl DiagnosticSink for Vec<QualifierDiagnostic> {
    fn report(&mut self, diagnostic: QualifierDiagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let span = Span::new(3, 8, 2, 4);
        let diag = QualifierDiagnostic::warning("N0001", "non-null pointer may become null")
            .at(span)
            .with_label("assigned here")
            .with_help("annotate the destination as nullable");

        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.span, span);
        assert_eq!(diag.to_string(), "non-null pointer may become null");
        assert!(!diag.is_error());
    }

    #[test]
    fn miette_sees_runtime_severity() {
        let diag = QualifierDiagnostic::error(codes::INCOMPATIBLE, "x");
        assert_eq!(Diagnostic::severity(&diag), Some(miette::Severity::Error));
        let code = Diagnostic::code(&diag).map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("Q0001"));
    }

    #[test]
    fn vec_sink_keeps_duplicates() {
        let mut sink: Vec<QualifierDiagnostic> = Vec::new();
        let diag = QualifierDiagnostic::error(codes::INCOMPATIBLE, "same");
        sink.report(diag.clone());
        sink.report(diag);
        assert_eq!(sink.len(), 2);
    }
}
