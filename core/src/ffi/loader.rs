//! Shared library handles.

use crate::ffi::{FfiError, native};

/// A loaded shared library, kept open until the registry is dropped.
pub struct Library {
    /// Path as written in the `link` statement; also the cache key.
    pub path: String,
    native: libloading::Library,
}

impl Library {
    /// Load a shared library. Bare names such as `libc.so.6` go through the
    /// system search path.
    ///
    /// # Example
    /// ```ignore
    /// let lib = Library::open("/lib/x86_64-linux-gnu/libc.so.6")?;
    /// let strlen = lib.symbol("strlen");
    /// ```
    pub fn open(path: &str) -> Result<Library, FfiError> {
        match native::open(path) {
            Ok(native) => Ok(Library {
                path: path.to_string(),
                native,
            }),
            Err(e) => Err(FfiError::LibraryLoad {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Address of `name`, or `None` if this library does not export it.
    pub fn symbol(&self, name: &str) -> Option<usize> {
        native::symbol(&self.native, name)
            .ok()
            .filter(|address| *address != 0)
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library").field("path", &self.path).finish()
    }
}

/// Candidate paths for the C library, most specific first.
#[cfg(test)]
pub(crate) const LIBC_CANDIDATES: &[&str] = &[
    "/lib/x86_64-linux-gnu/libc.so.6",
    "/lib64/libc.so.6",
    "libc.so.6",
];
