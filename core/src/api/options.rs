//! Limits applied while parsing and running programs.

pub use crate::parser::ParseOptions;

/// Runtime limits. Exceeding one stops the program with
/// [`Error::ResourceExceeded`](crate::api::Error::ResourceExceeded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Nested evaluations allowed at once; deep recursion is what hits it.
    pub max_depth: usize,
    /// Loop iterations allowed per top-level statement, unbounded when `None`.
    pub max_iterations: Option<usize>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_iterations: None,
        }
    }
}

/// ```
/// use aoxim_core::api::EngineOptions;
///
/// let options = EngineOptions::default().with_max_depth(200).with_max_iterations(10_000);
/// assert_eq!(options.execution.max_depth, 200);
/// assert_eq!(options.parse.max_depth, 500);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub execution: ExecutionOptions,
    pub parse: ParseOptions,
}

impl EngineOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.execution.max_depth = max_depth;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.execution.max_iterations = Some(max_iterations);
        self
    }
}
