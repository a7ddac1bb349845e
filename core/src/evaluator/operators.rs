//! Binary operator implementations.
//!
//! Operators never fail the evaluation: bad operands produce error values.

use core::cmp::Ordering;

use bumpalo::Bump;

use crate::{parser::BinaryOp, values::Value};

/// Apply `op` to two evaluated operands.
///
/// `and`/`or` look only at truthiness. Every other operator passes an error
/// operand through unchanged and sees through `any` wrappers.
pub fn binary<'a>(arena: &'a Bump, op: BinaryOp, left: Value<'a>, right: Value<'a>) -> Value<'a> {
    match op {
        BinaryOp::And => return Value::Bool(left.is_truthy() && right.is_truthy()),
        BinaryOp::Or => return Value::Bool(left.is_truthy() || right.is_truthy()),
        _ => {}
    }
    if left.is_error() {
        return left;
    }
    if right.is_error() {
        return right;
    }
    let (left, right) = (left.unwrap_any(), right.unwrap_any());

    let result = match op {
        BinaryOp::Eq => Ok(Value::Bool(left.structurally_equal(&right))),
        BinaryOp::Ne => Ok(Value::Bool(!left.structurally_equal(&right))),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => compare(op, left, right),
        _ => arithmetic(arena, op, left, right),
    };
    result.unwrap_or_else(|message| Value::error(arena, message))
}

fn compare<'a>(op: BinaryOp, left: Value<'a>, right: Value<'a>) -> Result<Value<'a>, &'static str> {
    let ordering = match (left, right) {
        (Value::Int(l), Value::Int(r)) => l.partial_cmp(&r),
        (Value::Char(l), Value::Char(r)) => l.partial_cmp(&r),
        (Value::Bool(l), Value::Bool(r)) => l.partial_cmp(&r),
        (Value::Str(l), Value::Str(r)) => l.partial_cmp(r),
        (Value::Double(_), _) | (_, Value::Double(_)) => match (as_f64(left), as_f64(right)) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => return Err("invalid operand types for comparison"),
        },
        _ => return Err("invalid operand types for comparison"),
    };

    // NaN compares false against everything
    let result = ordering.is_some_and(|ordering| match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::Le => ordering != Ordering::Greater,
        _ => ordering != Ordering::Less,
    });
    Ok(Value::Bool(result))
}

fn arithmetic<'a>(
    arena: &'a Bump,
    op: BinaryOp,
    left: Value<'a>,
    right: Value<'a>,
) -> Result<Value<'a>, &'static str> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => eval_binary_int(op, l, r).map(Value::Int),
        (Value::Double(_), Value::Int(_) | Value::Double(_))
        | (Value::Int(_), Value::Double(_)) => {
            let (l, r) = (as_f64(left).unwrap_or(0.0), as_f64(right).unwrap_or(0.0));
            eval_binary_double(op, l, r).map(Value::Double)
        }
        (Value::Str(l), Value::Str(r)) if op == BinaryOp::Add => {
            let mut joined = String::with_capacity(l.len() + r.len());
            joined.push_str(l);
            joined.push_str(r);
            Ok(Value::str(arena, &joined))
        }
        _ => Err("invalid operand types for operation"),
    }
}

/// Integer arithmetic. Overflow wraps instead of panicking.
pub(super) fn eval_binary_int(op: BinaryOp, left: i64, right: i64) -> Result<i64, &'static str> {
    match op {
        BinaryOp::Add => Ok(left.wrapping_add(right)),
        BinaryOp::Sub => Ok(left.wrapping_sub(right)),
        BinaryOp::Mul => Ok(left.wrapping_mul(right)),
        // Integer division truncates toward zero for both `/` and `//`
        BinaryOp::Div | BinaryOp::FloorDiv if right == 0 => Err("division by zero"),
        BinaryOp::Div | BinaryOp::FloorDiv => Ok(left.wrapping_div(right)),
        BinaryOp::Mod if right == 0 => Err("modulo by zero"),
        BinaryOp::Mod => Ok(left.wrapping_rem(right)),
        BinaryOp::Pow => {
            if right < 0 || right > u32::MAX as i64 {
                Ok(0)
            } else {
                Ok(left.wrapping_pow(right as u32))
            }
        }
        _ => Err("invalid operand types for operation"),
    }
}

/// Floating-point arithmetic. Only division and modulo check for zero.
pub(super) fn eval_binary_double(op: BinaryOp, left: f64, right: f64) -> Result<f64, &'static str> {
    match op {
        BinaryOp::Add => Ok(left + right),
        BinaryOp::Sub => Ok(left - right),
        BinaryOp::Mul => Ok(left * right),
        BinaryOp::Div | BinaryOp::FloorDiv if right == 0.0 => Err("division by zero"),
        BinaryOp::Div => Ok(left / right),
        BinaryOp::FloorDiv => Ok((left / right).floor()),
        BinaryOp::Mod if right == 0.0 => Err("modulo by zero"),
        BinaryOp::Mod => Ok(left % right),
        BinaryOp::Pow => Ok(left.powf(right)),
        _ => Err("invalid operand types for operation"),
    }
}

fn as_f64(value: Value<'_>) -> Option<f64> {
    match value {
        Value::Int(i) => Some(i as f64),
        Value::Double(d) => Some(d),
        Value::Char(c) => Some(c as f64),
        Value::Bool(b) => Some(b as i64 as f64),
        _ => None,
    }
}
