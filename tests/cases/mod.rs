//! Shared harness for the program tests.
//!
//! `test_case!` runs a whole program through a fresh engine and checks, in
//! any combination, the value of its last statement, what it printed, and the
//! diagnostics it reported.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use aoxim::{Diagnostic, Engine, EngineOptions, Error};
use bumpalo::Bump;

#[derive(Clone, Default)]
pub struct Captured(Rc<RefCell<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Outcome {
    /// The displayed value of the last statement, or the error that ended
    /// the run.
    pub result: Result<String, Error>,
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn run(source: &str) -> Outcome {
    let arena = Bump::new();
    let captured = Captured::default();
    let mut engine = Engine::new(&arena, EngineOptions::default(), |_, _| {})
        .with_output(Box::new(captured.clone()));

    let mut diagnostics = Vec::new();
    let result = engine
        .run("<test>", source, &mut |d| diagnostics.push(d.clone()))
        .map(|value| value.to_string());
    let output = String::from_utf8_lossy(&captured.0.borrow()).into_owned();
    Outcome {
        result,
        output,
        diagnostics,
    }
}

macro_rules! test_case {
    (
        $name:ident,
        input: $input:expr
        $(, result: $result:expr)?
        $(, output: $output:expr)?
        $(, diagnostics: [$($message:expr),* $(,)?])?
        $(, error: $error:pat)?
        $(,)?
    ) => {
        #[test]
        fn $name() {
            let outcome = $crate::cases::run($input);
            $(
                match &outcome.result {
                    Ok(value) => pretty_assertions::assert_eq!(value.as_str(), $result, "result"),
                    Err(err) => panic!("program stopped: {err}"),
                }
            )?
            $(
                pretty_assertions::assert_eq!(outcome.output.as_str(), $output, "output");
            )?
            $(
                let messages: Vec<&str> =
                    outcome.diagnostics.iter().map(|d| d.message.as_str()).collect();
                let expected: Vec<&str> = vec![$($message),*];
                pretty_assertions::assert_eq!(messages, expected, "diagnostics");
            )?
            $(
                assert!(
                    matches!(outcome.result, Err($error)),
                    "expected the program to stop, got {:?}",
                    outcome.result.as_ref().map(|v| v.as_str())
                );
            )?
            let _ = &outcome;
        }
    };
}
