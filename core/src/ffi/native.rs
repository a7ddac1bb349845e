//! The only place that touches raw addresses and native code.
//!
//! Everything here trusts its inputs: an `extern` declaration is taken at its
//! word, and a pointer value is assumed to point at memory of the type it is
//! read as. Nothing is verified at the native boundary.
#![allow(unsafe_code)]

use std::ffi::{CStr, c_char, c_void};

use crate::ffi::FfiError;

/// Largest argument count a foreign call supports.
pub const MAX_ARGS: usize = 10;

pub fn open(path: &str) -> Result<libloading::Library, libloading::Error> {
    unsafe { libloading::Library::new(path) }
}

pub fn symbol(library: &libloading::Library, name: &str) -> Result<usize, libloading::Error> {
    unsafe {
        library
            .get::<*const c_void>(name.as_bytes())
            .map(|sym| *sym as usize)
    }
}

macro_rules! invoke {
    (@slot $index:tt) => { i64 };
    ($address:expr, $args:expr; $($index:tt)*) => {{
        type Signature = extern "C" fn($(invoke!(@slot $index)),*) -> i64;
        let function = unsafe { core::mem::transmute::<usize, Signature>($address) };
        function($($args[$index]),*)
    }};
}

/// Calls the function at `address` with every argument and the result passed
/// as a 64-bit integer slot.
pub fn call_native(address: usize, args: &[i64]) -> Result<i64, FfiError> {
    if address == 0 {
        return Err(FfiError::InvalidArgument(
            "cannot call a null function pointer".to_string(),
        ));
    }
    let result = match args.len() {
        0 => invoke!(address, args;),
        1 => invoke!(address, args; 0),
        2 => invoke!(address, args; 0 1),
        3 => invoke!(address, args; 0 1 2),
        4 => invoke!(address, args; 0 1 2 3),
        5 => invoke!(address, args; 0 1 2 3 4),
        6 => invoke!(address, args; 0 1 2 3 4 5),
        7 => invoke!(address, args; 0 1 2 3 4 5 6),
        8 => invoke!(address, args; 0 1 2 3 4 5 6 7),
        9 => invoke!(address, args; 0 1 2 3 4 5 6 7 8),
        10 => invoke!(address, args; 0 1 2 3 4 5 6 7 8 9),
        count => {
            return Err(FfiError::TooManyArguments {
                count,
                max: MAX_ARGS,
            });
        }
    };
    Ok(result)
}

pub fn read_i64(address: usize) -> i64 {
    unsafe { (address as *const i64).read_unaligned() }
}

pub fn read_f64(address: usize) -> f64 {
    unsafe { (address as *const f64).read_unaligned() }
}

pub fn read_f32(address: usize) -> f32 {
    unsafe { (address as *const f32).read_unaligned() }
}

pub fn read_u8(address: usize) -> u8 {
    unsafe { (address as *const u8).read() }
}

pub fn read_usize(address: usize) -> usize {
    unsafe { (address as *const usize).read_unaligned() }
}

pub fn write_i64(address: usize, value: i64) {
    unsafe { (address as *mut i64).write_unaligned(value) }
}

pub fn write_f64(address: usize, value: f64) {
    unsafe { (address as *mut f64).write_unaligned(value) }
}

pub fn write_f32(address: usize, value: f32) {
    unsafe { (address as *mut f32).write_unaligned(value) }
}

pub fn write_u8(address: usize, value: u8) {
    unsafe { (address as *mut u8).write(value) }
}

pub fn write_usize(address: usize, value: usize) {
    unsafe { (address as *mut usize).write_unaligned(value) }
}

/// Copies the NUL-terminated string at `address`. Invalid UTF-8 is replaced.
pub fn read_c_string(address: usize) -> String {
    unsafe { CStr::from_ptr(address as *const c_char) }
        .to_string_lossy()
        .into_owned()
}
