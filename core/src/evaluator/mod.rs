//! Tree-walking evaluator for parsed aoxim programs.
//!
//! Expressions evaluate against a chain of [`Scope`](crate::scope::Scope)
//! frames. Script-level failures become `Value::Error` and keep flowing
//! through the program; only `exit`, failed assertions and exceeded limits
//! stop it.
//!
//! ## Design Principles
//!
//! - **Never panic**: every bad input becomes an error value
//! - **Stack-safe**: depth tracking turns runaway recursion into an error
//!
//! ## Example
//!
//! ```ignore
//! use aoxim_core::{api::ExecutionOptions, evaluator::Evaluator, parser};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let program = parser::parse(&arena, "x = 40 + 2").unwrap();
//! let mut evaluator = Evaluator::new(&arena, ExecutionOptions::default());
//! for item in program.items {
//!     if let parser::ItemKind::Statement(expr) = item.kind {
//!         evaluator.eval_statement(expr).unwrap();
//!     }
//! }
//! assert_eq!(evaluator.globals().lookup("x").and_then(|v| v.as_int()), Some(42));
//! ```

mod call;
mod error;
mod eval;
mod methods;
mod operators;


pub use error::{ExecutionError, ResourceExceededError};
pub use eval::{Evaluator, Flow};
pub use operators::binary;
