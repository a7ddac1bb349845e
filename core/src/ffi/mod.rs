//! Calling into native shared libraries.
//!
//! Libraries are loaded with `libloading` and kept open for the whole run.
//! Extern functions are called through a fixed convention: every argument and
//! the return value travel as one 64-bit integer, so a call needs no type
//! information beyond the tags in the declaration. Raw pointer reads and
//! writes are typed by the same tags.

mod loader;
mod marshal;
mod memory;
mod native;
mod registry;
mod types;

pub use loader::Library;
pub use marshal::{decode_return, encode_arg, variadic_type};
pub use memory::{MemoryBlock, MemoryTracker};
pub use native::MAX_ARGS;
pub use registry::{ExternFunction, FfiRegistry};
pub use types::FfiType;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FfiError {
    #[error("Error loading library '{path}': {message}")]
    LibraryLoad { path: String, message: String },

    #[error("Symbol '{symbol}' not found in loaded libraries")]
    SymbolNotFound { symbol: String },

    #[error("foreign call with {count} arguments exceeds the maximum of {max}")]
    TooManyArguments { count: usize, max: usize },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("alloc() size too large")]
    AllocationTooLarge { count: usize },

    #[error("extern function argument count mismatch")]
    ArgumentCount { expected: usize, found: usize },
}
