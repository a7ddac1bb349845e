//! Public error types for the aoxim API.
//!
//! Parse problems never stop a run; they are reported as [`Diagnostic`]s through
//! the engine's callback. [`Error`] is reserved for conditions that end a run.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::lexer::{SourceLoc, Span};

/// Error that ends a run.
#[derive(Debug, Error)]
pub enum Error {
    /// The script called `exit(code)`.
    #[error("exit with code {code}")]
    Exit { code: i32 },

    /// `assert` failed.
    #[error("{message}")]
    AssertionFailed { message: String },

    /// Resource limits exceeded (e.g., stack overflow, iteration limit).
    #[error("Resource limit exceeded: {0}")]
    ResourceExceeded(String),

    /// Reading a source file or writing program output failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid API usage.
    #[error("API error: {0}")]
    Api(String),
}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Name of the source the diagnostic refers to, when known.
    pub file: Option<String>,

    /// Line and column of the primary issue.
    pub loc: SourceLoc,

    /// Byte range of the primary issue.
    pub span: Span,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "P001").
    pub code: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, loc: SourceLoc, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            file: None,
            loc,
            span,
            help: None,
            code: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file)?;
        }
        write!(f, "{}: {}: {}", self.loc, self.severity, self.message)
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl From<crate::evaluator::ExecutionError> for Error {
    fn from(err: crate::evaluator::ExecutionError) -> Self {
        use crate::evaluator::ExecutionError;
        match err {
            ExecutionError::Exit(code) => Error::Exit { code },
            ExecutionError::AssertionFailed(message) => Error::AssertionFailed { message },
            ExecutionError::ResourceExceeded(res_err) => {
                Error::ResourceExceeded(format!("{}", res_err))
            }
            ExecutionError::Output(source) => Error::Io {
                path: PathBuf::from("<output>"),
                source,
            },
        }
    }
}
