//! Callable values: script lambdas, native builtins and foreign functions.

use crate::evaluator::{Evaluator, ExecutionError};
use crate::ffi::ExternFunction;
use crate::parser::Expr;
use crate::scope::Scope;
use crate::values::Value;

/// Type alias for native builtin function pointers.
///
/// Natives receive every evaluated argument and report script-level problems
/// as `Value::Error`; the `Err` channel is reserved for fatal conditions such
/// as `exit` and failed assertions.
///
/// # Example
///
/// ```ignore
/// fn double_it<'a>(_: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
///     Ok(match args {
///         [Value::Int(n)] => Value::Int(n * 2),
///         _ => Value::Null,
///     })
/// }
/// ```
pub type NativeFn<'a> =
    fn(&mut Evaluator<'a>, &[Value<'a>]) -> Result<Value<'a>, ExecutionError>;

#[derive(Clone, Copy)]
pub enum FunctionKind<'a> {
    Lambda { body: &'a Expr<'a> },
    Native { name: &'a str, func: NativeFn<'a> },
    Foreign(&'a ExternFunction<'a>),
}

#[derive(Clone, Copy)]
pub struct Function<'a> {
    /// Declared parameter names. A variadic function collects surplus
    /// arguments into a list bound to the last one.
    pub params: &'a [&'a str],
    /// Arguments already supplied by partial application.
    pub bound: &'a [Value<'a>],
    pub kind: FunctionKind<'a>,
    pub is_variadic: bool,
    /// Scope the lambda was defined in; `None` means the global scope.
    pub closure: Option<&'a Scope<'a>>,
}

impl<'a> Function<'a> {
    pub fn lambda(
        params: &'a [&'a str],
        is_variadic: bool,
        body: &'a Expr<'a>,
        closure: Option<&'a Scope<'a>>,
    ) -> Self {
        Self {
            params,
            bound: &[],
            kind: FunctionKind::Lambda { body },
            is_variadic,
            closure,
        }
    }

    pub fn native(name: &'a str, func: NativeFn<'a>) -> Self {
        Self {
            params: &[],
            bound: &[],
            kind: FunctionKind::Native { name, func },
            is_variadic: true,
            closure: None,
        }
    }

    pub fn foreign(ext: &'a ExternFunction<'a>) -> Self {
        Self {
            params: &[],
            bound: &[],
            kind: FunctionKind::Foreign(ext),
            is_variadic: ext.is_variadic,
            closure: None,
        }
    }

    /// Parameters still waiting for an argument.
    pub fn remaining(&self) -> usize {
        self.params.len().saturating_sub(self.bound.len())
    }
}

impl<'a> core::fmt::Debug for Function<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            FunctionKind::Lambda { .. } => f
                .debug_struct("Lambda")
                .field("params", &self.params)
                .field("bound", &self.bound.len())
                .field("is_variadic", &self.is_variadic)
                .finish(),
            FunctionKind::Native { name, .. } => write!(f, "Native({name})"),
            FunctionKind::Foreign(ext) => write!(f, "Foreign({})", ext.name),
        }
    }
}
