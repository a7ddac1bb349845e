//! Member access, method calls and indexing.

use smallvec::SmallVec;

use crate::{
    evaluator::{Evaluator, ExecutionError},
    values::Value,
};

impl<'a> Evaluator<'a> {
    /// `receiver.method(args...)`.
    ///
    /// On a struct a field holding a function wins over a method of the same
    /// name; a field holding anything else is returned as is. Both kinds of
    /// callee receive the struct as their first argument.
    pub fn call_method(
        &mut self,
        receiver: Value<'a>,
        method: &str,
        args: &[Value<'a>],
    ) -> Result<Value<'a>, ExecutionError> {
        let receiver = receiver.unwrap_any();
        let value = match (receiver, method, args) {
            (Value::Struct(instance), _, _) => {
                let callee = match instance.get(method) {
                    Some(Value::Function(function)) => Some(function),
                    Some(field) => return Ok(field),
                    None => instance.def.method(method),
                };
                return match callee {
                    Some(function) => {
                        let mut with_self: SmallVec<[Value<'a>; 8]> = SmallVec::new();
                        with_self.push(receiver);
                        with_self.extend_from_slice(args);
                        self.call_function(function, &with_self)
                    }
                    None => Ok(self.error("method/member not found")),
                };
            }

            (Value::Int(n), "bin", []) => {
                let sign = if n < 0 { "-" } else { "" };
                Value::str(self.arena(), &format!("{sign}0b{:b}", n.unsigned_abs()))
            }
            (Value::Int(n), "hex", []) => Value::str(self.arena(), &format!("0x{n:x}")),

            (Value::Str(s), "upper", []) => Value::str(self.arena(), &s.to_ascii_uppercase()),
            (Value::Str(s), "lower", []) => Value::str(self.arena(), &s.to_ascii_lowercase()),
            (Value::Str(s), "len", []) => Value::Int(s.chars().count() as i64),

            (Value::List(list), "append", [item]) => {
                list.push(*item);
                Value::Null
            }
            (Value::List(list), "pop", []) => list.pop().unwrap_or(Value::Null),
            (Value::List(list), "len", []) => Value::Int(list.len() as i64),

            _ => Value::Null,
        };
        Ok(value)
    }

    /// `object.field`. Anything that is not a struct field is treated as a
    /// method call without arguments.
    pub(super) fn member(&mut self, object: Value<'a>, field: &str) -> Result<Value<'a>, ExecutionError> {
        if let Value::Struct(instance) = object.unwrap_any()
            && let Some(value) = instance.get(field)
        {
            return Ok(value);
        }
        self.call_method(object, field, &[])
    }

    /// `value[index]` on lists, tuples and strings.
    pub(super) fn index(&self, value: Value<'a>, index: Value<'a>) -> Value<'a> {
        if value.is_error() {
            return value;
        }
        if index.is_error() {
            return index;
        }

        let (kind, len, element) = match (value.unwrap_any(), index.unwrap_any()) {
            (Value::List(list), Value::Int(i)) => {
                ("list", list.len(), usize::try_from(i).ok().and_then(|i| list.get(i)))
            }
            (Value::Tuple(items), Value::Int(i)) => (
                "tuple",
                items.len(),
                usize::try_from(i).ok().and_then(|i| items.get(i).copied()),
            ),
            (Value::Str(s), Value::Int(i)) => (
                "string",
                s.chars().count(),
                usize::try_from(i)
                    .ok()
                    .and_then(|i| s.chars().nth(i))
                    .map(|c| self.char_string(c)),
            ),
            _ => return self.error("cannot index non-sequence or with non-integer"),
        };

        match (element, index.as_int()) {
            (Some(element), _) => element,
            (None, Some(i)) if i < 0 => self.error(&format!("{kind} index cannot be negative")),
            _ => {
                tracing::trace!(kind, len, "index out of range");
                self.error(&format!("{kind} index out of range"))
            }
        }
    }
}
