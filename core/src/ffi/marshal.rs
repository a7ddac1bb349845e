//! Packing interpreter values into 64-bit argument slots and back.

use bumpalo::Bump;

use crate::ffi::{FfiError, FfiType, MemoryTracker, native};
use crate::values::{Pointer, Value};

/// The type a variadic extra argument is passed as, chosen from the value.
pub fn variadic_type(value: Value<'_>) -> FfiType {
    match value.unwrap_any() {
        Value::Int(_) | Value::Bool(_) => FfiType::Int,
        Value::Double(_) => FfiType::Double,
        Value::Str(_) => FfiType::Str,
        Value::Pointer(_) => FfiType::Ptr,
        _ => FfiType::Any,
    }
}

/// Encodes one argument. Strings are copied into `memory`, which keeps them
/// alive for as long as native code might hold on to them.
pub fn encode_arg(value: Value<'_>, ty: FfiType, memory: &mut MemoryTracker) -> Result<i64, FfiError> {
    let value = value.unwrap_any();
    let slot = match ty {
        FfiType::Void | FfiType::Variadic => 0,
        FfiType::Any => match value {
            Value::Int(i) => i,
            Value::Double(d) => d.to_bits() as i64,
            Value::Pointer(ptr) => ptr.address() as i64,
            Value::Str(s) => memory.c_string(s)? as i64,
            _ => 0,
        },
        FfiType::Int | FfiType::Long | FfiType::Char | FfiType::Bool => match value {
            Value::Int(i) => i,
            Value::Double(d) => d as i64,
            Value::Bool(b) => b as i64,
            Value::Char(c) => c as i64,
            _ => return Err(invalid("int")),
        },
        FfiType::Double | FfiType::Float => {
            let d = match value {
                Value::Double(d) => d,
                Value::Int(i) => i as f64,
                _ => return Err(invalid("double")),
            };
            if ty == FfiType::Float {
                (d as f32).to_bits() as i64
            } else {
                d.to_bits() as i64
            }
        }
        FfiType::Str => match value {
            Value::Str(s) => memory.c_string(s)? as i64,
            _ => return Err(invalid("string")),
        },
        FfiType::Ptr => match value {
            Value::Pointer(ptr) => ptr.address() as i64,
            Value::Str(s) => memory.c_string(s)? as i64,
            Value::Int(i) => i,
            _ => 0,
        },
    };
    Ok(slot)
}

fn invalid(kind: &str) -> FfiError {
    FfiError::InvalidArgument(format!("invalid argument type for FFI {kind} parameter"))
}

/// Interprets a raw return slot according to the declared return type.
pub fn decode_return<'a>(arena: &'a Bump, raw: i64, ty: FfiType) -> Value<'a> {
    match ty {
        FfiType::Int | FfiType::Long | FfiType::Char | FfiType::Bool | FfiType::Any => {
            Value::Int(raw)
        }
        FfiType::Double => Value::Double(f64::from_bits(raw as u64)),
        FfiType::Float => Value::Double(f32::from_bits(raw as u32) as f64),
        FfiType::Str if raw == 0 => Value::Null,
        FfiType::Str => Value::str(arena, &native::read_c_string(raw as usize)),
        FfiType::Ptr => Value::Pointer(Pointer::Raw {
            addr: raw as usize,
            tag: None,
        }),
        FfiType::Void | FfiType::Variadic => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variadic_extras_are_typed_from_values() {
        let arena = Bump::new();
        assert_eq!(variadic_type(Value::Bool(true)), FfiType::Int);
        assert_eq!(variadic_type(Value::Double(1.0)), FfiType::Double);
        assert_eq!(variadic_type(Value::Str("s")), FfiType::Str);
        assert_eq!(variadic_type(Value::null_ptr()), FfiType::Ptr);
        assert_eq!(variadic_type(Value::Null), FfiType::Any);
        assert_eq!(variadic_type(Value::any(&arena, Value::Int(1))), FfiType::Int);
    }

    #[test]
    fn test_encode_widens_scalars() {
        let mut memory = MemoryTracker::new();
        assert_eq!(encode_arg(Value::Bool(true), FfiType::Int, &mut memory), Ok(1));
        assert_eq!(encode_arg(Value::Char(b'a'), FfiType::Char, &mut memory), Ok(97));
        assert_eq!(encode_arg(Value::Double(2.9), FfiType::Long, &mut memory), Ok(2));
    }

    #[test]
    fn test_encode_floats_preserve_bits() {
        let mut memory = MemoryTracker::new();
        assert_eq!(
            encode_arg(Value::Double(1.5), FfiType::Double, &mut memory),
            Ok(1.5f64.to_bits() as i64)
        );
        assert_eq!(
            encode_arg(Value::Int(2), FfiType::Float, &mut memory),
            Ok(2.0f32.to_bits() as i64)
        );
    }

    #[test]
    fn test_encode_strings_copy_into_tracked_memory() {
        let mut memory = MemoryTracker::new();
        let slot = encode_arg(Value::Str("abc"), FfiType::Str, &mut memory).unwrap();
        assert_eq!(native::read_c_string(slot as usize), "abc");
        assert!(memory.find(slot as usize).is_some());
    }

    #[test]
    fn test_encode_rejects_mismatched_types() {
        let mut memory = MemoryTracker::new();
        let err = encode_arg(Value::Str("x"), FfiType::Int, &mut memory).unwrap_err();
        assert_eq!(err.to_string(), "invalid argument type for FFI int parameter");
        assert!(encode_arg(Value::Int(1), FfiType::Str, &mut memory).is_err());
        assert_eq!(encode_arg(Value::Null, FfiType::Ptr, &mut memory), Ok(0));
    }

    #[test]
    fn test_decode_return() {
        let arena = Bump::new();
        assert_eq!(decode_return(&arena, -3, FfiType::Long), Value::Int(-3));
        assert_eq!(
            decode_return(&arena, 0.25f64.to_bits() as i64, FfiType::Double),
            Value::Double(0.25)
        );
        assert_eq!(
            decode_return(&arena, 0.5f32.to_bits() as i64, FfiType::Float),
            Value::Double(0.5)
        );
        assert_eq!(decode_return(&arena, 0, FfiType::Str), Value::Null);
        assert_eq!(decode_return(&arena, 99, FfiType::Void), Value::Null);
        assert!(matches!(
            decode_return(&arena, 0x10, FfiType::Ptr),
            Value::Pointer(Pointer::Raw { addr: 0x10, tag: None })
        ));
    }
}
