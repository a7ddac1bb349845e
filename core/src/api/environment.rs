//! Environment builder for registering global values.

use bumpalo::Bump;

use crate::api::Error;
use crate::scope::Scope;
use crate::values::{Function, NativeFn, Value};

/// Builder for the global environment.
///
/// Everything registered here is a constant visible to every program the
/// engine runs.
///
/// # Example
///
/// ```
/// use aoxim_core::api::{Engine, EngineOptions};
/// use aoxim_core::values::Value;
/// use bumpalo::Bump;
///
/// let arena = Bump::new();
///
/// // EnvironmentBuilder is used inside Engine::new
/// let engine = Engine::new(&arena, EngineOptions::default(), |_arena, env| {
///     env.register("answer", Value::Int(42)).unwrap();
/// });
/// assert_eq!(engine.global("answer"), Some(Value::Int(42)));
/// ```
pub struct EnvironmentBuilder<'a> {
    arena: &'a Bump,
    scope: &'a Scope<'a>,
}

impl<'a> EnvironmentBuilder<'a> {
    /// Create a builder that defines names in `scope`.
    pub fn new(arena: &'a Bump, scope: &'a Scope<'a>) -> Self {
        Self { arena, scope }
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    /// Register a global constant. Registering a name twice is an error.
    pub fn register(&mut self, name: &str, value: Value<'a>) -> Result<(), Error> {
        if self.scope.contains_local(name) {
            return Err(Error::Api(format!("global '{name}' is already registered")));
        }
        self.scope.define(name, value, true);
        Ok(())
    }

    /// Register a native function under `name`.
    ///
    /// # Example
    ///
    /// ```
    /// use aoxim_core::api::{Engine, EngineOptions};
    /// use aoxim_core::evaluator::{Evaluator, ExecutionError};
    /// use aoxim_core::values::Value;
    /// use bumpalo::Bump;
    ///
    /// fn twice<'a>(_: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    ///     Ok(match args {
    ///         [Value::Int(n)] => Value::Int(n * 2),
    ///         _ => Value::Null,
    ///     })
    /// }
    ///
    /// let arena = Bump::new();
    /// let mut engine = Engine::new(&arena, EngineOptions::default(), |_arena, env| {
    ///     env.native("twice", twice).unwrap();
    /// });
    /// let result = engine.run("<doc>", "twice(21)", &mut |_| {}).unwrap();
    /// assert_eq!(result, Value::Int(42));
    /// ```
    pub fn native(&mut self, name: &str, func: NativeFn<'a>) -> Result<(), Error> {
        let name: &'a str = self.arena.alloc_str(name);
        let function = Value::function(self.arena, Function::native(name, func));
        self.register(name, function)
    }
}
