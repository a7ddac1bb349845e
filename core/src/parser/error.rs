use thiserror::Error;

use crate::api::{Diagnostic, Severity};
use crate::lexer::{LexError, SourceLoc, Span};

/// Parser error with location.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub loc: SourceLoc,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Lex(LexError),

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("unclosed delimiter '{delimiter}'")]
    UnclosedDelimiter { delimiter: char },

    #[error("{message}")]
    InvalidLiteral { message: String },

    #[error("expression nesting depth exceeds maximum of {max_depth} levels")]
    MaxDepthExceeded { max_depth: usize },

    #[error("{message}")]
    InvalidTarget { message: String },

    #[error("{message}")]
    MisplacedDefinition { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, loc: SourceLoc, span: Span) -> Self {
        Self { kind, loc, span }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ParseErrorKind::Lex(_) => ("P000", None),
            ParseErrorKind::UnexpectedToken { .. } => ("P001", None),
            ParseErrorKind::UnclosedDelimiter { .. } => {
                ("P002", Some("Add the missing closing delimiter"))
            }
            ParseErrorKind::InvalidLiteral { .. } => ("P003", None),
            ParseErrorKind::MaxDepthExceeded { .. } => {
                ("P004", Some("Reduce nesting or simplify the expression"))
            }
            ParseErrorKind::InvalidTarget { .. } => ("P005", None),
            ParseErrorKind::MisplacedDefinition { .. } => ("P006", None),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.message(),
            file: None,
            loc: self.loc,
            span: self.span.clone(),
            help: help.map(|s| s.to_string()),
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let diagnostic = self.to_diagnostic();
        write!(f, "{}: {}: {}", self.loc, diagnostic.severity, diagnostic.message)?;

        if let Some(ref code) = diagnostic.code {
            write!(f, " [{}]", code)?;
        }

        if let Some(help_msg) = &diagnostic.help {
            write!(f, "\nhelp: {}", help_msg)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
