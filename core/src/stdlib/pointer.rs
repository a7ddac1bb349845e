//! Pointer conversions and raw memory access.

use crate::evaluator::{Evaluator, ExecutionError};
use crate::ffi::FfiType;
use crate::values::{Pointer, Value};

use super::takes_one;

pub fn ptr_to_int<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "ptr_to_int"));
    };
    Ok(match arg.unwrap_any() {
        Value::Pointer(ptr) => Value::Int(ptr.address() as i64),
        _ => evaluator.error("ptr_to_int() requires a pointer argument"),
    })
}

/// `int_to_ptr(address)` or `int_to_ptr(address, "type")`. The type name tags
/// the pointer so reads through it use that type.
pub fn int_to_ptr<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let (address, tag) = match args {
        [address] => (address, None),
        [address, tag] => match tag.as_str() {
            Some(name) => (address, Some(FfiType::parse(name))),
            None => return Ok(evaluator.error("int_to_ptr() type must be a string")),
        },
        _ => return Ok(evaluator.error("int_to_ptr() takes 1 or 2 arguments")),
    };
    Ok(match address.as_int() {
        Some(addr) => Value::Pointer(Pointer::Raw {
            addr: addr as usize,
            tag,
        }),
        None => evaluator.error("int_to_ptr() requires an integer argument"),
    })
}

/// `_store_ptr(p, v)`: writes `v` through `p` and returns `v`.
///
/// A pointer to a variable assigns the variable. A raw pointer is written as
/// its own tag, else as the type of the tracked block at that address, else
/// as an int.
pub fn store_ptr<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [target, value] = args else {
        return Ok(evaluator.error("_store_ptr() takes exactly 2 arguments (ptr, value)"));
    };
    let value = *value;
    match target.unwrap_any() {
        Value::Pointer(ptr) if ptr.is_null() => Ok(evaluator.error("cannot store to null pointer")),
        Value::Pointer(Pointer::Var(binding)) => {
            if binding.is_const() {
                return Ok(evaluator.error(&format!("cannot reassign const '{}'", binding.name)));
            }
            binding.set(value);
            Ok(value)
        }
        Value::Pointer(Pointer::Raw { addr, tag }) => {
            let memory = evaluator.ffi_mut().memory_mut();
            let tag = tag
                .or_else(|| memory.find(addr).map(|block| block.tag))
                .unwrap_or(FfiType::Int);
            match memory.store(addr, value, tag) {
                Ok(()) => Ok(value),
                Err(err) => Ok(evaluator.error(&err.to_string())),
            }
        }
        _ => Ok(evaluator.error("first argument must be a pointer")),
    }
}

/// `alloc("type")` or `alloc("type", count)`: zeroed memory owned by the
/// interpreter, returned as a pointer tagged with the element type.
pub fn alloc<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let (name, count) = match args {
        [name] => (name, 1),
        [name, count] => match count.as_int() {
            Some(count) if count > 0 => (name, count as usize),
            _ => return Ok(evaluator.error("alloc() count must be a positive int")),
        },
        _ => return Ok(evaluator.error("alloc() takes 1 or 2 arguments")),
    };
    let Some(tag) = name.as_str().map(FfiType::parse) else {
        return Ok(evaluator.error("alloc() type must be a string"));
    };
    if tag.cell_size() == 0 {
        return Ok(evaluator.error(&format!("cannot allocate values of type {tag}")));
    }
    match evaluator.ffi_mut().memory_mut().allocate(tag, count) {
        Ok(addr) => Ok(Value::Pointer(Pointer::Raw { addr, tag: Some(tag) })),
        Err(err) => Ok(evaluator.error(&err.to_string())),
    }
}
