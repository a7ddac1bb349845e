//! Public API for embedding the aoxim interpreter.
//!
//! An [`Engine`] owns the global environment and runs programs item by item.
//! Hosts add their own globals through [`EnvironmentBuilder`] when creating
//! the engine, and receive parse problems as [`Diagnostic`]s.
//!
//! # Example
//!
//! ```
//! use aoxim_core::api::{Engine, EngineOptions};
//! use aoxim_core::values::Value;
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let mut engine = Engine::new(&arena, EngineOptions::default(), |_arena, env| {
//!     env.register("pi", Value::Double(3.14159)).unwrap();
//! });
//!
//! let mut diagnostics = Vec::new();
//! let result = engine
//!     .run("<example>", "r = 2\npi * r * r", &mut |d| diagnostics.push(d.clone()))
//!     .unwrap();
//! assert!(diagnostics.is_empty());
//! assert_eq!(result.to_string(), "12.5664");
//! ```

pub mod engine;
pub mod environment;
pub mod error;
pub mod import;
pub mod options;

pub use engine::Engine;
pub use environment::EnvironmentBuilder;
pub use error::{Diagnostic, Error, Severity};
pub use import::{FileResolver, ImportResolver};
pub use options::{EngineOptions, ExecutionOptions, ParseOptions};
