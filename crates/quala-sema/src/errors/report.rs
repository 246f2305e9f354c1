// errors/report.rs
//! Rendering utilities for qualifier diagnostics.

use miette::{
    Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, ThemeCharacters, ThemeStyles,
};

use super::QualifierDiagnostic;

/// Create a handler for terminal output (unicode + colors).
pub fn terminal_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::unicode(),
        styles: ThemeStyles::ansi(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Create a handler for plain output (ascii + no colors).
pub fn plain_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    };
    GraphicalReportHandler::new_themed(theme)
}

fn render_with(
    handler: &GraphicalReportHandler,
    diagnostic: &QualifierDiagnostic,
    unit_name: &str,
    source: Option<&str>,
) -> String {
    let mut output = String::new();
    let result = match source {
        Some(source) => {
            let report = miette::Report::new(diagnostic.clone())
                .with_source_code(NamedSource::new(unit_name, source.to_string()));
            handler.render_report(&mut output, report.as_ref())
        }
        None => handler.render_report(&mut output, diagnostic as &dyn Diagnostic),
    };
    if result.is_err() {
        tracing::debug!(code = diagnostic.code, "diagnostic rendering failed");
    }
    output
}

/// Render without colors, attaching the unit's source text when available.
pub fn render_to_string(
    diagnostic: &QualifierDiagnostic,
    unit_name: &str,
    source: Option<&str>,
) -> String {
    render_with(&plain_handler(), diagnostic, unit_name, source)
}

/// Render every diagnostic, in order, into one string.
pub fn render_all(diagnostics: &[QualifierDiagnostic], unit_name: &str, source: Option<&str>) -> String {
    diagnostics
        .iter()
        .map(|d| render_to_string(d, unit_name, source))
        .collect()
}

/// Render to stderr with unicode/colors.
pub fn render_to_stderr(diagnostic: &QualifierDiagnostic, unit_name: &str, source: Option<&str>) {
    let output = render_with(&terminal_handler(), diagnostic, unit_name, source);
    eprint!("{}", output);
}
