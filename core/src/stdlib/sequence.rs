//! `len`, `range` and `tuple`.

use crate::evaluator::{Evaluator, ExecutionError};
use crate::values::Value;

/// Length of a list, tuple or string (in characters). None for anything else.
pub fn len<'a>(_evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(Value::Null);
    };
    Ok(match arg.unwrap_any() {
        Value::List(list) => Value::Int(list.len() as i64),
        Value::Tuple(items) => Value::Int(items.len() as i64),
        Value::Str(s) => Value::Int(s.chars().count() as i64),
        _ => Value::Null,
    })
}

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)`.
///
/// Counts toward `stop` without reaching it. A zero step gives an empty list;
/// arguments that are not ints give None.
pub fn range<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let ints: Option<Vec<i64>> = args.iter().map(Value::as_int).collect();
    let (start, stop, step) = match ints.as_deref() {
        Some(&[stop]) => (0, stop, 1),
        Some(&[start, stop]) => (start, stop, 1),
        Some(&[start, stop, step]) => (start, stop, step),
        _ => return Ok(Value::Null),
    };

    let mut items = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        items.push(Value::Int(i));
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(Value::list(evaluator.arena(), &items))
}

/// `tuple(...)`: its arguments as a tuple.
pub fn tuple<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    Ok(Value::tuple(evaluator.arena(), args))
}
