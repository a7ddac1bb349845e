//! Aoxim - a small dynamically typed scripting language with a C FFI
//!
//! # Overview
//!
//! Aoxim programs are lists of statements and definitions evaluated one after
//! another against a global environment. Values are dynamically typed; runtime
//! problems such as division by zero produce error *values* that flow through
//! expressions instead of aborting the program. Native code is reached by
//! loading shared libraries with `link` and declaring functions with `extern`.
//!
//! # Quick Start
//!
//! ```
//! use aoxim::{Engine, EngineOptions, Value};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let mut engine = Engine::new(&arena, EngineOptions::default(), |_arena, env| {
//!     env.register("limit", Value::Int(3)).unwrap();
//! });
//!
//! let source = "
//! squares = []
//! for i : 0..limit { squares.append(i * i) }
//! squares
//! ";
//! let result = engine.run("<doc>", source, &mut |_| {}).unwrap();
//! assert_eq!(result.to_string(), "[0, 1, 4]");
//! ```
//!
//! # Native Functions
//!
//! Host functions receive the evaluator and their arguments:
//!
//! ```
//! use aoxim::{Engine, EngineOptions, ExecutionError, Value};
//! use aoxim::evaluator::Evaluator;
//! use bumpalo::Bump;
//!
//! fn twice<'a>(_: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
//!     Ok(match args {
//!         [Value::Int(n)] => Value::Int(n * 2),
//!         _ => Value::Null,
//!     })
//! }
//!
//! let arena = Bump::new();
//! let mut engine = Engine::new(&arena, EngineOptions::default(), |_arena, env| {
//!     env.native("twice", twice).unwrap();
//! });
//! let result = engine.run("<doc>", "twice(21)", &mut |_| {}).unwrap();
//! assert_eq!(result, Value::Int(42));
//! ```

pub mod error_renderer;

pub use aoxim_core::api::{
    Diagnostic, Engine, EngineOptions, EnvironmentBuilder, Error, ExecutionOptions, FileResolver,
    ImportResolver, ParseOptions, Severity,
};
pub use aoxim_core::evaluator::{self, ExecutionError};
pub use aoxim_core::values::{self, Function, NativeFn, Value};
pub use aoxim_core::{SourceLoc, Span};

pub use error_renderer::{render_diagnostic, render_diagnostic_to_string, render_error};
