//! Conditions that stop evaluation.
//!
//! Script-level failures such as division by zero or a bad index are not
//! errors here: they are `Value::Error` values that scripts can inspect.
//! `ExecutionError` covers what a script cannot recover from.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutionError {
    /// `exit(code)` was called.
    #[error("exit with code {0}")]
    Exit(i32),

    /// `assert` failed.
    #[error("{0}")]
    AssertionFailed(String),

    /// Resource limit exceeded.
    #[error(transparent)]
    ResourceExceeded(#[from] ResourceExceededError),

    /// Writing program output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Resource limit exceeded errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceExceededError {
    /// Evaluation recursion depth exceeded.
    #[error("Evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },

    /// More loop iterations than `ExecutionOptions::max_iterations` allows.
    #[error("Iteration limit exceeded: more than {max_iterations} loop iterations")]
    IterationLimit { max_iterations: usize },
}
