//! The aoxim execution engine.

use std::io::Write;
use std::path::{Path, PathBuf};

use bumpalo::Bump;
use hashbrown::HashSet;

use super::{Diagnostic, EngineOptions, EnvironmentBuilder, Error, FileResolver, ImportResolver, Severity};
use crate::evaluator::Evaluator;
use crate::ffi::FfiType;
use crate::lexer::{SourceLoc, Span};
use crate::parser::{Expr, ExternDecl, Item, ItemKind, Parser};
use crate::stdlib::register_stdlib;
use crate::values::{Function, Value};

/// Runs aoxim programs against a persistent global environment.
///
/// The engine manages:
/// - The global environment (builtins plus whatever the host registers)
/// - The evaluator and its FFI state
/// - Import resolution and the set of files already imported
///
/// Programs are parsed and evaluated one top-level item at a time, so a
/// statement runs before the next one is parsed and a malformed statement
/// does not prevent the rest of the program from running.
///
/// # Lifetimes
///
/// - `'a`: Lifetime of the arena holding source text, syntax trees and values.
///
/// # Example
///
/// ```
/// use aoxim_core::api::{Engine, EngineOptions};
/// use aoxim_core::values::Value;
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
/// let mut engine = Engine::new(&arena, EngineOptions::default(), |_arena, env| {
///     env.register("base", Value::Int(40)).unwrap();
/// });
///
/// let result = engine.run("<example>", "add(a, b) = a + b\nadd(base, 2)", &mut |_| {}).unwrap();
/// assert_eq!(result, Value::Int(42));
/// ```
pub struct Engine<'a> {
    arena: &'a Bump,
    options: EngineOptions,
    evaluator: Evaluator<'a>,
    resolver: Box<dyn ImportResolver>,
    imported: HashSet<PathBuf>,
    error_count: usize,
}

impl<'a> Engine<'a> {
    /// Create a new engine with the builtins plus a custom environment.
    ///
    /// The initialization closure receives:
    /// - `arena`: The arena for allocating environment data
    /// - `env`: The environment builder for registering globals
    pub fn new(
        arena: &'a Bump,
        options: EngineOptions,
        init: impl FnOnce(&'a Bump, &mut EnvironmentBuilder<'a>),
    ) -> Self {
        let evaluator = Evaluator::new(arena, options.execution.clone());
        let mut env = EnvironmentBuilder::new(arena, evaluator.globals());
        if let Err(err) = register_stdlib(&mut env) {
            tracing::error!(%err, "failed to register builtins");
        }
        init(arena, &mut env);

        Self {
            arena,
            options,
            evaluator,
            resolver: Box::new(FileResolver::default()),
            imported: HashSet::new(),
            error_count: 0,
        }
    }

    /// Send program output somewhere other than stdout.
    pub fn with_output(self, output: Box<dyn Write + 'a>) -> Self {
        Self {
            evaluator: self.evaluator.with_output(output),
            ..self
        }
    }

    /// Replace the filesystem import resolver.
    pub fn with_resolver(self, resolver: Box<dyn ImportResolver>) -> Self {
        Self { resolver, ..self }
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The current value of a global.
    pub fn global(&self, name: &str) -> Option<Value<'a>> {
        self.evaluator.globals().lookup(name)
    }

    pub fn evaluator(&self) -> &Evaluator<'a> {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator<'a> {
        &mut self.evaluator
    }

    /// Number of error diagnostics reported so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Run `source`, reporting diagnostics through `report` as they occur.
    ///
    /// Returns the value of the last statement. Assignments and definitions
    /// yield None unless they produced an error.
    pub fn run(
        &mut self,
        source_name: &str,
        source: &str,
        report: &mut dyn FnMut(&Diagnostic),
    ) -> Result<Value<'a>, Error> {
        self.run_source(source_name, None, source, report)
    }

    /// Run the program in `path`. A file that cannot be read is reported as
    /// a diagnostic.
    pub fn run_file(&mut self, path: &Path, report: &mut dyn FnMut(&Diagnostic)) -> Result<Value<'a>, Error> {
        let name = path.display().to_string();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                tracing::debug!(path = %name, %err, "could not read source file");
                let diagnostic = Diagnostic::error("could not open file", SourceLoc::START, Span::new(0, 0))
                    .with_file(name);
                self.emit(&diagnostic, report);
                return Ok(Value::Null);
            }
        };
        self.imported.insert(canonical(path));
        self.run_source(&name, Some(path), &source, report)
    }

    fn run_source(
        &mut self,
        name: &str,
        path: Option<&Path>,
        source: &str,
        report: &mut dyn FnMut(&Diagnostic),
    ) -> Result<Value<'a>, Error> {
        let source: &'a str = self.arena.alloc_str(source);
        let mut parser = Parser::new(self.arena, source, self.options.parse.clone());
        let mut last = Value::Null;

        while let Some(parsed) = parser.next_item() {
            let item = match parsed {
                Ok(item) => item,
                Err(errors) => {
                    // Later errors in the same item are usually knock-on effects
                    if let Some(first) = errors.first() {
                        self.emit(&first.to_diagnostic().with_file(name), report);
                    }
                    continue;
                }
            };

            last = match item.kind {
                ItemKind::Statement(expr) => {
                    tracing::trace!(file = name, line = item.loc.line, "evaluating statement");
                    let value = self.evaluator.eval_statement(expr)?;
                    if is_definition(expr) && !value.is_error() {
                        Value::Null
                    } else {
                        value
                    }
                }
                ItemKind::Import(target) => {
                    self.import(target, name, path, &item, report)?;
                    Value::Null
                }
                ItemKind::Link(library) => {
                    if let Err(err) = self.evaluator.ffi_mut().load_library(library) {
                        self.emit_at(err.to_string(), name, &item, report);
                    }
                    Value::Null
                }
                ItemKind::Extern(ref decl) => {
                    self.declare_extern(decl, name, &item, report);
                    Value::Null
                }
            };
        }
        Ok(last)
    }

    fn import(
        &mut self,
        target: &str,
        name: &str,
        importing_file: Option<&Path>,
        item: &Item<'a>,
        report: &mut dyn FnMut(&Diagnostic),
    ) -> Result<(), Error> {
        let Some(resolved) = self.resolver.resolve(target, importing_file) else {
            self.emit_at(format!("could not find import file: {target}"), name, item, report);
            return Ok(());
        };
        if !self.imported.insert(canonical(&resolved)) {
            tracing::trace!(path = %resolved.display(), "already imported");
            return Ok(());
        }
        tracing::debug!(path = %resolved.display(), "importing");
        self.run_file(&resolved, report).map(|_| ())
    }

    fn declare_extern(
        &mut self,
        decl: &ExternDecl<'a>,
        name: &str,
        item: &Item<'a>,
        report: &mut dyn FnMut(&Diagnostic),
    ) {
        let params: Vec<FfiType> = decl.params.iter().map(|ty| FfiType::parse(ty)).collect();
        let ret = FfiType::parse(decl.ret);
        let ext = match self
            .evaluator
            .ffi_mut()
            .declare_extern(decl.name, decl.symbol, &params, ret)
        {
            Ok(ext) => ext,
            Err(err) => {
                self.emit_at(err.to_string(), name, item, report);
                return;
            }
        };

        let function = Value::function(self.arena, Function::foreign(ext));
        if let Err(err) = self.evaluator.globals().assign(decl.name, function) {
            self.emit_at(err.to_string(), name, item, report);
        }
    }

    fn emit_at(&mut self, message: String, file: &str, item: &Item<'a>, report: &mut dyn FnMut(&Diagnostic)) {
        let diagnostic = Diagnostic::error(message, item.loc, item.span.clone()).with_file(file);
        self.emit(&diagnostic, report);
    }

    fn emit(&mut self, diagnostic: &Diagnostic, report: &mut dyn FnMut(&Diagnostic)) {
        if diagnostic.severity == Severity::Error {
            self.error_count += 1;
        }
        report(diagnostic);
    }
}

/// Statements whose value the REPL does not echo.
fn is_definition(expr: &Expr<'_>) -> bool {
    matches!(
        expr,
        Expr::Assign { .. } | Expr::Unpack { .. } | Expr::StructDef { .. }
    )
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
