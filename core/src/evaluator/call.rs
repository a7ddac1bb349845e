//! Function application.

use smallvec::SmallVec;

use crate::{
    evaluator::{Evaluator, ExecutionError, Flow},
    ffi::ExternFunction,
    parser::Expr,
    scope::Scope,
    values::{Function, FunctionKind, Value},
};

type Args<'a> = SmallVec<[Value<'a>; 8]>;

impl<'a> Evaluator<'a> {
    /// `callee(args...)`. A bare name declared `extern` resolves to the
    /// foreign function even if a variable shadows it.
    pub(super) fn eval_call(
        &mut self,
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
        scope: &'a Scope<'a>,
    ) -> Result<Value<'a>, ExecutionError> {
        if let Some(ext) = callee.as_ident().and_then(|name| self.ffi().lookup(name)) {
            let args = self.eval_all(args, scope)?;
            return Ok(self.call_extern(ext, &args));
        }
        let callee = self.eval_value(callee, scope)?;
        let args = self.eval_all(args, scope)?;
        self.call_value(callee, &args)
    }

    /// Calls `callee` if it is a function. Calling anything else yields null.
    pub fn call_value(&mut self, callee: Value<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
        match callee.unwrap_any() {
            Value::Function(function) => self.call_function(function, args),
            _ => Ok(Value::Null),
        }
    }

    /// Applies `function` to `args`, after any arguments bound earlier.
    ///
    /// A non-variadic lambda given fewer arguments than it declares returns a
    /// new function with those arguments bound. Missing arguments of a
    /// variadic lambda are null.
    pub fn call_function(
        &mut self,
        function: &'a Function<'a>,
        args: &[Value<'a>],
    ) -> Result<Value<'a>, ExecutionError> {
        let mut all: Args<'a> = SmallVec::with_capacity(function.bound.len() + args.len());
        all.extend_from_slice(function.bound);
        all.extend_from_slice(args);

        match function.kind {
            FunctionKind::Native { func, .. } => func(self, &all),
            FunctionKind::Foreign(ext) => Ok(self.call_extern(ext, &all)),
            FunctionKind::Lambda { body } => {
                if !function.is_variadic && args.len() < function.remaining() {
                    let partial = Function {
                        bound: self.arena().alloc_slice_copy(&all),
                        ..*function
                    };
                    return Ok(Value::function(self.arena(), partial));
                }

                let frame = function.closure.unwrap_or(self.globals()).child();
                self.bind_params(frame, function, &all);

                Ok(match self.eval(body, frame)? {
                    Flow::Normal(value) | Flow::Return(value) => value,
                    // Loop control does not cross a call
                    Flow::Break | Flow::Continue => Value::Null,
                })
            }
        }
    }

    fn bind_params(&self, frame: &'a Scope<'a>, function: &Function<'a>, args: &[Value<'a>]) {
        let params = function.params;
        let fixed = if function.is_variadic {
            params.len().saturating_sub(1)
        } else {
            params.len()
        };

        for (i, name) in params[..fixed].iter().enumerate() {
            frame.define(name, args.get(i).copied().unwrap_or(Value::Null), false);
        }
        if function.is_variadic
            && let Some(rest_name) = params.last()
        {
            let rest = args.get(fixed..).unwrap_or(&[]);
            frame.define(rest_name, Value::list(self.arena(), rest), false);
        }
    }

    /// Foreign calls report failures as error values.
    fn call_extern(&mut self, ext: &ExternFunction<'a>, args: &[Value<'a>]) -> Value<'a> {
        match self.ffi_mut().call(ext, args) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(name = ext.name, error = %err, "foreign call failed");
                self.error(&err.to_string())
            }
        }
    }
}
