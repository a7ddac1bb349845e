//! Type conversions and checks. Conversions see through `any`.

use crate::evaluator::{Evaluator, ExecutionError};
use crate::values::{Value, format_double};

use super::takes_one;

pub fn int<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "int"));
    };
    Ok(match arg.unwrap_any() {
        Value::Int(i) => Value::Int(i),
        Value::Double(d) => Value::Int(d as i64),
        Value::Bool(b) => Value::Int(b as i64),
        Value::Char(c) => Value::Int(c as i64),
        Value::Pointer(ptr) => Value::Int(ptr.address() as i64),
        Value::Str(s) => match s.trim_start().parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => evaluator.error("cannot convert string to int: invalid format"),
        },
        _ => evaluator.error("cannot convert to int"),
    })
}

pub fn double<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "double"));
    };
    Ok(match arg.unwrap_any() {
        Value::Double(d) => Value::Double(d),
        Value::Int(i) => Value::Double(i as f64),
        Value::Bool(b) => Value::Double(if b { 1.0 } else { 0.0 }),
        Value::Str(s) => match s.trim_start().parse::<f64>() {
            Ok(d) => Value::Double(d),
            Err(_) => evaluator.error("cannot convert string to double: invalid format"),
        },
        _ => evaluator.error("cannot convert to double"),
    })
}

/// `str(v)` for scalars, pointers and errors. Containers cannot be converted.
pub fn str<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "str"));
    };
    let arena = evaluator.arena();
    Ok(match arg.unwrap_any() {
        s @ Value::Str(_) => s,
        Value::Double(d) => Value::str(arena, &format_double(d)),
        Value::Char(c) => Value::str(arena, &(c as char).to_string()),
        scalar @ (Value::Int(_)
        | Value::Bool(_)
        | Value::Null
        | Value::Pointer(_)
        | Value::Error(_)) => Value::str(arena, &scalar.to_string()),
        _ => evaluator.error("cannot convert to string"),
    })
}

pub fn bool<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "bool"));
    };
    Ok(Value::Bool(arg.is_truthy()))
}

/// `char(v)`: an int in 0..=255, or the first byte of a string.
pub fn char<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "char"));
    };
    Ok(match arg.unwrap_any() {
        Value::Char(c) => Value::Char(c),
        Value::Int(i) => match u8::try_from(i) {
            Ok(c) => Value::Char(c),
            Err(_) => evaluator.error("char() requires value 0-255"),
        },
        Value::Str(s) => match s.bytes().next() {
            Some(c) => Value::Char(c),
            None => evaluator.error("cannot convert empty string to char"),
        },
        _ => evaluator.error("cannot convert to char"),
    })
}

/// `any(v)`: boxes `v` so its type is hidden from `type()`.
pub fn any<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "any"));
    };
    Ok(Value::any(evaluator.arena(), *arg))
}

pub fn is_error<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "is_error"));
    };
    Ok(Value::Bool(arg.unwrap_any().is_error()))
}

/// True for None and for null pointers.
pub fn is_null<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "is_null"));
    };
    Ok(Value::Bool(match arg.unwrap_any() {
        Value::Null => true,
        Value::Pointer(ptr) => ptr.is_null(),
        _ => false,
    }))
}
