//! Core evaluation logic.

use std::io::Write;

use bumpalo::Bump;

use crate::{
    api::ExecutionOptions,
    evaluator::{
        ExecutionError,
        ResourceExceededError::{IterationLimit, StackOverflow},
        operators,
    },
    ffi::FfiRegistry,
    parser::{Expr, Literal, StepOp},
    scope::{Scope, ScopeError},
    values::{Function, Pointer, StructDef, Value},
};

/// Result of evaluating one expression, with the control-flow signal that
/// rides along with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow<'a> {
    Normal(Value<'a>),
    Return(Value<'a>),
    Break,
    Continue,
}

impl<'a> Flow<'a> {
    /// The carried value; `break` and `continue` carry none.
    pub fn value(self) -> Value<'a> {
        match self {
            Flow::Normal(value) | Flow::Return(value) => value,
            Flow::Break | Flow::Continue => Value::Null,
        }
    }
}

/// Tree-walking evaluator.
///
/// Owns the global scope, the FFI state and the sink `print` writes to. All
/// values it produces live in `arena`.
pub struct Evaluator<'a> {
    options: ExecutionOptions,
    arena: &'a Bump,
    globals: &'a Scope<'a>,
    ffi: FfiRegistry<'a>,
    output: Box<dyn Write + 'a>,
    depth: usize,
    iterations: usize,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator with an empty global scope that prints to stdout.
    pub fn new(arena: &'a Bump, options: ExecutionOptions) -> Self {
        Self {
            options,
            arena,
            globals: Scope::global(arena),
            ffi: FfiRegistry::new(arena),
            output: Box::new(std::io::stdout()),
            depth: 0,
            iterations: 0,
        }
    }

    /// Redirect program output.
    pub fn with_output(mut self, output: Box<dyn Write + 'a>) -> Self {
        self.output = output;
        self
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    pub fn globals(&self) -> &'a Scope<'a> {
        self.globals
    }

    pub fn ffi(&self) -> &FfiRegistry<'a> {
        &self.ffi
    }

    pub fn ffi_mut(&mut self) -> &mut FfiRegistry<'a> {
        &mut self.ffi
    }

    pub fn output(&mut self) -> &mut dyn Write {
        &mut *self.output
    }

    /// An error value with `message` allocated in the arena.
    pub fn error(&self, message: &str) -> Value<'a> {
        Value::error(self.arena, message)
    }

    /// Evaluate a top-level statement in the global scope.
    ///
    /// `return` at top level yields its value; a stray `break` or `continue`
    /// yields null.
    pub fn eval_statement(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>, ExecutionError> {
        self.iterations = 0;
        let flow = self.eval(expr, self.globals)?;
        Ok(flow.value())
    }

    /// Evaluate an expression node.
    pub fn eval(&mut self, expr: &'a Expr<'a>, scope: &'a Scope<'a>) -> Result<Flow<'a>, ExecutionError> {
        // Check depth before recursing
        if self.depth >= self.options.max_depth {
            return Err(StackOverflow {
                depth: self.depth,
                max_depth: self.options.max_depth,
            }
            .into());
        }

        self.depth += 1;
        let result = self.eval_inner(expr, scope);
        self.depth -= 1;

        result
    }

    /// Evaluate an operand. Control-flow signals do not escape operand
    /// positions.
    pub fn eval_value(&mut self, expr: &'a Expr<'a>, scope: &'a Scope<'a>) -> Result<Value<'a>, ExecutionError> {
        Ok(self.eval(expr, scope)?.value())
    }

    pub(super) fn eval_all(
        &mut self,
        exprs: &'a [&'a Expr<'a>],
        scope: &'a Scope<'a>,
    ) -> Result<Vec<Value<'a>>, ExecutionError> {
        exprs.iter().map(|expr| self.eval_value(expr, scope)).collect()
    }

    fn eval_inner(&mut self, expr: &'a Expr<'a>, scope: &'a Scope<'a>) -> Result<Flow<'a>, ExecutionError> {
        let value = match expr {
            Expr::Literal(literal) => match *literal {
                Literal::Int(i) => Value::Int(i),
                Literal::Double(d) => Value::Double(d),
                Literal::Str(s) => Value::Str(s),
                Literal::Char(c) => Value::Char(c),
                Literal::Bool(b) => Value::Bool(b),
            },

            Expr::NullPtr => Value::null_ptr(),

            Expr::Ident(name) => match scope.lookup(name) {
                Some(value) => value,
                None => {
                    tracing::trace!(name, "undefined name evaluates to None");
                    Value::Null
                }
            },

            Expr::Binary { op, left, right } => {
                let left = self.eval_value(left, scope)?;
                let right = self.eval_value(right, scope)?;
                operators::binary(self.arena, *op, left, right)
            }

            Expr::Call { callee, args } => self.eval_call(callee, args, scope)?,

            Expr::Lambda {
                params,
                is_variadic,
                body,
            } => Value::function(
                self.arena,
                Function::lambda(params, *is_variadic, body, Some(scope)),
            ),

            Expr::Assign {
                name,
                value,
                is_const,
            } => {
                let value = self.eval_value(value, scope)?;
                match self.bind(scope, name, value, *is_const) {
                    Ok(()) => value,
                    Err(err) => self.error(&err.to_string()),
                }
            }

            Expr::Unpack {
                targets,
                value,
                is_const,
            } => {
                let rhs = self.eval_value(value, scope)?;
                self.unpack(scope, targets, rhs, *is_const)
            }

            Expr::MemberAssign {
                object,
                field,
                value,
            } => {
                let value = self.eval_value(value, scope)?;
                if value.is_error() {
                    return Ok(Flow::Normal(value));
                }
                match self.eval_value(object, scope)?.unwrap_any() {
                    Value::Struct(instance) if instance.set(field, value) => value,
                    Value::Struct(_) => self.error("field not found in struct for assignment"),
                    _ => self.error("cannot assign to member of non-struct"),
                }
            }

            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.eval_value(cond, scope)?;
                return match (cond.is_truthy(), else_branch) {
                    (true, _) => self.eval(then_branch, scope),
                    (false, Some(else_branch)) => self.eval(else_branch, scope),
                    (false, None) => Ok(Flow::Normal(Value::Null)),
                };
            }

            Expr::While { cond, body } => {
                let mut result = Value::Null;
                while self.eval_value(cond, scope)?.is_truthy() {
                    self.tick()?;
                    match self.eval(body, scope)? {
                        Flow::Normal(value) => result = value,
                        Flow::Break => {
                            result = Value::Null;
                            break;
                        }
                        Flow::Continue => result = Value::Null,
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
                result
            }

            Expr::For {
                index,
                var,
                iterable,
                body,
            } => return self.eval_for(*index, var, iterable, body, scope),

            Expr::List(items) => {
                let items = self.eval_all(items, scope)?;
                Value::list(self.arena, &items)
            }

            Expr::Tuple(items) => {
                let items = self.eval_all(items, scope)?;
                Value::tuple(self.arena, &items)
            }

            Expr::Range { start, end } => {
                let start = self.eval_value(start, scope)?;
                let end = self.eval_value(end, scope)?;
                match (start.as_int(), end.as_int()) {
                    (Some(start), Some(end)) => self.range(start, end),
                    _ => self.error("range requires integer bounds"),
                }
            }

            Expr::Index { value, index } => {
                let value = self.eval_value(value, scope)?;
                let index = self.eval_value(index, scope)?;
                self.index(value, index)
            }

            Expr::Member { value, field } => {
                let object = self.eval_value(value, scope)?;
                self.member(object, field)?
            }

            Expr::MethodCall {
                receiver,
                method,
                args,
            } => {
                let receiver = self.eval_value(receiver, scope)?;
                let args = self.eval_all(args, scope)?;
                self.call_method(receiver, method, &args)?
            }

            Expr::Block(statements) => {
                let mut result = Value::Null;
                for statement in statements.iter() {
                    match self.eval(statement, scope)? {
                        Flow::Normal(value) => result = value,
                        other => return Ok(other),
                    }
                }
                result
            }

            Expr::Return(value) => {
                let value = match value {
                    Some(value) => self.eval_value(value, scope)?,
                    None => Value::Null,
                };
                return Ok(Flow::Return(value));
            }

            Expr::Break => return Ok(Flow::Break),

            Expr::Continue => return Ok(Flow::Continue),

            Expr::FormatStr { strs, exprs } => {
                let mut text = String::from(strs[0]);
                for (expr, suffix) in exprs.iter().zip(strs[1..].iter()) {
                    let value = self.eval_value(expr, scope)?;
                    text.push_str(&value.to_text());
                    text.push_str(suffix);
                }
                Value::str(self.arena, &text)
            }

            Expr::StructDef {
                name,
                fields,
                methods,
            } => {
                let mut def = StructDef::new(self.arena, name, fields);
                for (method, lambda) in methods.iter() {
                    if let Value::Function(function) = self.eval_value(lambda, scope)? {
                        def.methods.insert(*method, function);
                    }
                }
                let value = Value::StructDef(self.arena.alloc(def));
                match scope.assign(name, value) {
                    Ok(_) => value,
                    Err(err) => self.error(&err.to_string()),
                }
            }

            Expr::StructInit { name, fields } => {
                let def = match scope.lookup(name).map(Value::unwrap_any) {
                    Some(Value::StructDef(def)) => def,
                    _ => return Ok(Flow::Normal(self.error("struct not defined"))),
                };
                let instance = def.instantiate(self.arena);
                for (field, expr) in fields.iter() {
                    if def.field_index(field).is_none() {
                        return Ok(Flow::Normal(self.error("field not found in struct")));
                    }
                    let value = self.eval_value(expr, scope)?;
                    instance.set(field, value);
                }
                Value::Struct(instance)
            }

            Expr::Match { scrutinee, arms } => {
                let target = self.eval_value(scrutinee, scope)?;
                for (pattern, body) in arms.iter() {
                    let pattern = self.eval_value(pattern, scope)?;
                    if target.structurally_equal(&pattern) {
                        return self.eval(body, scope);
                    }
                }
                Value::Null
            }

            Expr::Step { op, target, prefix } => self.step(scope, *op, target, *prefix),

            Expr::PtrCast(inner) => match self.eval_value(inner, scope)?.unwrap_any() {
                Value::Int(i) => Value::Pointer(Pointer::Raw {
                    addr: i as usize,
                    tag: None,
                }),
                ptr @ Value::Pointer(_) => ptr,
                Value::Null => Value::null_ptr(),
                _ => self.error("pointer can only be created from int, null, or another pointer"),
            },

            Expr::Deref(inner) => {
                let value = self.eval_value(inner, scope)?;
                self.deref(value)
            }

            Expr::AddressOf(name) => match scope.binding(name) {
                Some(binding) => Value::Pointer(Pointer::Var(binding)),
                None => self.error(&format!("cannot take address of undefined variable '{name}'")),
            },
        };
        Ok(Flow::Normal(value))
    }

    /// `name = value`. A const binding replaces whatever the frame had unless
    /// that was itself const.
    fn bind(&self, scope: &'a Scope<'a>, name: &str, value: Value<'a>, is_const: bool) -> Result<(), ScopeError> {
        if !is_const {
            return scope.assign(name, value).map(|_| ());
        }
        if let Some(existing) = scope.binding(name)
            && existing.is_const()
        {
            return Err(ScopeError::ConstReassign {
                name: name.to_string(),
            });
        }
        scope.define(name, value, true);
        Ok(())
    }

    fn unpack(&self, scope: &'a Scope<'a>, targets: &[&str], rhs: Value<'a>, is_const: bool) -> Value<'a> {
        let items = match rhs {
            Value::Tuple(items) => items.to_vec(),
            Value::List(list) => list.snapshot(),
            _ => return self.error("cannot unpack non-sequence"),
        };
        if items.len() != targets.len() {
            return self.error("unpacking count mismatch");
        }
        for (name, item) in targets.iter().zip(items) {
            if let Err(err) = self.bind(scope, name, item, is_const) {
                return self.error(&err.to_string());
            }
        }
        rhs
    }

    fn eval_for(
        &mut self,
        index: Option<&'a str>,
        var: &'a str,
        iterable: &'a Expr<'a>,
        body: &'a Expr<'a>,
        scope: &'a Scope<'a>,
    ) -> Result<Flow<'a>, ExecutionError> {
        let iterable = self.eval_value(iterable, scope)?;
        if iterable.is_error() {
            return Ok(Flow::Normal(iterable));
        }

        // Pairs of (index, element). Structs pair field names with values.
        let pairs: Vec<(Value<'a>, Value<'a>)> = match iterable.unwrap_any() {
            Value::List(list) => enumerate(list.snapshot()),
            Value::Tuple(items) => enumerate(items.iter().copied()),
            Value::Str(s) => enumerate(s.chars().map(|c| self.char_string(c))),
            Value::Struct(instance) => instance
                .entries()
                .map(|(name, value)| (Value::Str(name), value))
                .collect(),
            _ => {
                return Ok(Flow::Normal(self.error(
                    "for loop requires iterable (list, tuple, string, struct, or range)",
                )));
            }
        };

        let mut result = Value::Null;
        for (key, element) in pairs {
            self.tick()?;
            let bound = match index {
                Some(index) => scope
                    .assign(index, key)
                    .and_then(|_| scope.assign(var, element)),
                None => scope.assign(var, element),
            };
            if let Err(err) = bound {
                return Ok(Flow::Normal(self.error(&err.to_string())));
            }
            match self.eval(body, scope)? {
                Flow::Normal(value) => result = value,
                Flow::Break => {
                    result = Value::Null;
                    break;
                }
                Flow::Continue => result = Value::Null,
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        Ok(Flow::Normal(result))
    }

    /// Exclusive range, counting down when `end < start`.
    fn range(&self, start: i64, end: i64) -> Value<'a> {
        let items: Vec<Value<'a>> = if start <= end {
            (start..end).map(Value::Int).collect()
        } else {
            ((end + 1)..=start).rev().map(Value::Int).collect()
        };
        Value::list(self.arena, &items)
    }

    fn step(&self, scope: &'a Scope<'a>, op: StepOp, target: &str, prefix: bool) -> Value<'a> {
        match scope.lookup(target) {
            Some(Value::Int(old)) => {
                let new = Value::Int(old.wrapping_add(op.delta()));
                if let Err(err) = scope.assign(target, new) {
                    return self.error(&err.to_string());
                }
                if prefix { new } else { Value::Int(old) }
            }
            _ => match op {
                StepOp::Increment => self.error("increment requires integer variable"),
                StepOp::Decrement => self.error("decrement requires integer variable"),
            },
        }
    }

    fn deref(&self, value: Value<'a>) -> Value<'a> {
        match value.unwrap_any() {
            err @ Value::Error(_) => err,
            Value::Pointer(ptr) if ptr.is_null() => self.error("dereferencing null pointer"),
            Value::Pointer(Pointer::Var(binding)) => binding.get(),
            Value::Pointer(Pointer::Raw { addr, tag }) => self.ffi.memory().read(self.arena, addr, tag),
            _ => self.error("cannot dereference non-pointer"),
        }
    }

    pub(super) fn char_string(&self, c: char) -> Value<'a> {
        let mut buf = [0u8; 4];
        Value::str(self.arena, c.encode_utf8(&mut buf))
    }

    /// Counts one loop iteration against `max_iterations`.
    fn tick(&mut self) -> Result<(), ExecutionError> {
        self.iterations += 1;
        match self.options.max_iterations {
            Some(max_iterations) if self.iterations > max_iterations => {
                Err(IterationLimit { max_iterations }.into())
            }
            _ => Ok(()),
        }
    }
}

fn enumerate<'a>(items: impl IntoIterator<Item = Value<'a>>) -> Vec<(Value<'a>, Value<'a>)> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| (Value::Int(i as i64), item))
        .collect()
}
