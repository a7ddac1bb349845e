#![deny(unsafe_code)]

pub mod api;
pub mod evaluator;
pub mod ffi;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod stdlib;
pub mod values;

pub use lexer::{SourceLoc, Span};

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    use bumpalo::Bump;

    use crate::api::{Diagnostic, Engine, EngineOptions, Error};
    use crate::values::Value;

    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_closure_capture() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }

    /// Output sink whose contents can be read back after the engine wrote
    /// to it.
    #[derive(Clone, Default)]
    pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

    impl SharedOutput {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// An engine with captured output and diagnostics.
    pub struct Runner<'a> {
        pub engine: Engine<'a>,
        output: SharedOutput,
        pub diagnostics: Vec<Diagnostic>,
    }

    impl<'a> Runner<'a> {
        pub fn new(arena: &'a Bump) -> Self {
            Self::with_options(arena, EngineOptions::default())
        }

        pub fn with_options(arena: &'a Bump, options: EngineOptions) -> Self {
            let output = SharedOutput::default();
            let engine = Engine::new(arena, options, |_, _| {}).with_output(Box::new(output.clone()));
            Self {
                engine,
                output,
                diagnostics: Vec::new(),
            }
        }

        pub fn run(&mut self, source: &str) -> Result<Value<'a>, Error> {
            let diagnostics = &mut self.diagnostics;
            self.engine
                .run("<test>", source, &mut |d| diagnostics.push(d.clone()))
        }

        /// Runs `source`, which must not stop the program.
        pub fn eval(&mut self, source: &str) -> Value<'a> {
            self.run(source)
                .unwrap_or_else(|err| panic!("{source:?} failed: {err}"))
        }

        pub fn output(&self) -> String {
            self.output.contents()
        }
    }
}
