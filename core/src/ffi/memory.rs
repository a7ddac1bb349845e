//! Interpreter-owned native memory and typed reads/writes through raw pointers.

use std::ffi::CString;

use bumpalo::Bump;

use crate::ffi::{FfiError, FfiType, native};
use crate::values::{Pointer, Value};

/// Largest block `alloc` hands out, in bytes.
pub const MAX_ALLOCATION: usize = 1 << 28;

/// A block of native memory the interpreter handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBlock {
    pub address: usize,
    pub size: usize,
    pub tag: FfiType,
}

/// Owns every buffer given to native code. Buffers are freed only when the
/// tracker is dropped, so addresses stay valid for the whole run.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    blocks: Vec<MemoryBlock>,
    buffers: Vec<Box<[u64]>>,
    strings: Vec<CString>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroed, 8-byte aligned storage for `count` cells of `tag`.
    pub fn allocate(&mut self, tag: FfiType, count: usize) -> Result<usize, FfiError> {
        let size = tag
            .cell_size()
            .max(1)
            .checked_mul(count.max(1))
            .filter(|&size| size <= MAX_ALLOCATION)
            .ok_or(FfiError::AllocationTooLarge { count })?;
        let buffer = vec![0u64; size.div_ceil(8)].into_boxed_slice();
        let address = buffer.as_ptr() as usize;
        self.buffers.push(buffer);
        self.blocks.push(MemoryBlock { address, size, tag });
        tracing::trace!(address, size, %tag, "allocated block");
        Ok(address)
    }

    /// Copies `text` into a NUL-terminated buffer and returns its address.
    pub fn c_string(&mut self, text: &str) -> Result<usize, FfiError> {
        let owned = CString::new(text).map_err(|_| {
            FfiError::InvalidArgument("string passed to native code contains a NUL byte".into())
        })?;
        let address = owned.as_ptr() as usize;
        self.blocks.push(MemoryBlock {
            address,
            size: text.len() + 1,
            tag: FfiType::Char,
        });
        self.strings.push(owned);
        Ok(address)
    }

    /// The block starting exactly at `address`.
    pub fn find(&self, address: usize) -> Option<&MemoryBlock> {
        self.blocks.iter().find(|block| block.address == address)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Reads the value at `address`, typed by `tag`, else by the block that
    /// starts there, else as a 64-bit integer.
    pub fn read<'a>(&self, arena: &'a Bump, address: usize, tag: Option<FfiType>) -> Value<'a> {
        if address == 0 {
            return Value::error(arena, "dereferencing null pointer");
        }
        let tag = tag
            .or_else(|| self.find(address).map(|block| block.tag))
            .unwrap_or(FfiType::Int);
        match tag {
            FfiType::Double => Value::Double(native::read_f64(address)),
            FfiType::Float => Value::Double(native::read_f32(address) as f64),
            FfiType::Char => Value::Char(native::read_u8(address)),
            FfiType::Str => match native::read_usize(address) {
                0 => Value::Null,
                target => Value::str(arena, &native::read_c_string(target)),
            },
            FfiType::Ptr => Value::Pointer(Pointer::Raw {
                addr: native::read_usize(address),
                tag: None,
            }),
            FfiType::Int
            | FfiType::Long
            | FfiType::Bool
            | FfiType::Any
            | FfiType::Void
            | FfiType::Variadic => Value::Int(native::read_i64(address)),
        }
    }

    /// Writes `value` at `address` in the representation of `tag`. Values the
    /// tag has no representation for leave memory untouched.
    pub fn store(&mut self, address: usize, value: Value<'_>, tag: FfiType) -> Result<(), FfiError> {
        let value = value.unwrap_any();
        match (tag, value) {
            (FfiType::Int | FfiType::Long | FfiType::Bool, Value::Int(i)) => native::write_i64(address, i),
            (FfiType::Int | FfiType::Long | FfiType::Bool, Value::Double(d)) => {
                native::write_i64(address, d as i64)
            }
            (FfiType::Int | FfiType::Long | FfiType::Bool, Value::Bool(b)) => {
                native::write_i64(address, b as i64)
            }
            (FfiType::Double, Value::Double(d)) => native::write_f64(address, d),
            (FfiType::Double, Value::Int(i)) => native::write_f64(address, i as f64),
            (FfiType::Float, Value::Double(d)) => native::write_f32(address, d as f32),
            (FfiType::Float, Value::Int(i)) => native::write_f32(address, i as f32),
            (FfiType::Char, Value::Char(c)) => native::write_u8(address, c),
            (FfiType::Char, Value::Int(i)) => native::write_u8(address, i as u8),
            (FfiType::Str, Value::Str(s)) => {
                let copy = self.c_string(s)?;
                native::write_usize(address, copy);
            }
            (FfiType::Ptr, Value::Pointer(ptr)) => native::write_usize(address, ptr.address()),
            (FfiType::Ptr, Value::Int(i)) => native::write_usize(address, i as usize),
            _ => {}
        }
        Ok(())
    }
}
