//! Error rendering using ariadne
//!
//! Diagnostics carry byte spans into the source they were reported for; this
//! module turns them into annotated snippets. Errors that end a run have no
//! span and are rendered as a single line.

use crate::{Diagnostic, Error, Severity};
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render a diagnostic for `source` to stderr.
pub fn render_diagnostic(diagnostic: &Diagnostic, source: &str, use_color: bool) {
    render_diagnostic_to(diagnostic, source, &mut std::io::stderr(), use_color).ok();
}

/// Render a diagnostic to a String (useful for tests, web UIs, etc.)
///
/// # Example
/// ```
/// use aoxim::{Engine, EngineOptions, render_diagnostic_to_string};
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
/// let mut engine = Engine::new(&arena, EngineOptions::default(), |_, _| {});
///
/// let source = "x = (1 +";
/// let mut rendered = Vec::new();
/// engine
///     .run("<doc>", source, &mut |d| rendered.push(render_diagnostic_to_string(d, source, false)))
///     .unwrap();
/// assert!(rendered[0].contains("x = (1 +"));
/// ```
pub fn render_diagnostic_to_string(diagnostic: &Diagnostic, source: &str, use_color: bool) -> String {
    let mut buf = Vec::new();
    render_diagnostic_to(diagnostic, source, &mut buf, use_color).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render a diagnostic to a specific writer.
pub fn render_diagnostic_to(
    diagnostic: &Diagnostic,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let file = diagnostic.file.as_deref().unwrap_or("<input>");
    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    // Clamp so a span past the end (e.g. "unexpected end of input") still renders
    let end = diagnostic.span.0.end.min(source.len());
    let start = diagnostic.span.0.start.min(end);
    let span = (file, start..end);

    let mut report = Report::build(kind, span.clone())
        .with_message(format!("{}: {}", diagnostic.loc, diagnostic.message))
        .with_config(
            Config::default()
                .with_color(use_color)
                .with_index_type(IndexType::Byte),
        );

    if let Some(code) = &diagnostic.code {
        report = report.with_code(code);
    }
    report = report.with_label(
        Label::new(span)
            .with_message(&diagnostic.message)
            .with_color(Color::Red),
    );
    if let Some(help) = &diagnostic.help {
        report = report.with_help(help);
    }

    report.finish().write((file, Source::from(source)), &mut *writer)
}

/// Render an error that ended a run to stderr.
pub fn render_error(error: &Error) {
    render_error_to(error, &mut std::io::stderr()).ok();
}

/// Render an error that ended a run to a specific writer.
pub fn render_error_to(error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    match error {
        Error::AssertionFailed { message } => writeln!(writer, "{message}"),
        other => writeln!(writer, "error: {other}"),
    }
}
