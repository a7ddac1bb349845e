//! Loaded libraries and declared extern functions.

use bumpalo::Bump;
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::ffi::{FfiError, FfiType, Library, MemoryTracker, marshal, native};
use crate::values::Value;

/// A foreign function bound by an `extern` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternFunction<'a> {
    /// Name visible to scripts.
    pub name: &'a str,
    /// Native symbol the name is bound to.
    pub symbol: &'a str,
    pub params: &'a [FfiType],
    pub ret: FfiType,
    /// Declared with a trailing variadic marker.
    pub is_variadic: bool,
    pub address: usize,
}

impl<'a> ExternFunction<'a> {
    /// Parameters with a declared type, excluding the variadic marker.
    pub fn fixed_params(&self) -> &'a [FfiType] {
        if self.is_variadic {
            &self.params[..self.params.len() - 1]
        } else {
            self.params
        }
    }
}

pub struct FfiRegistry<'a> {
    arena: &'a Bump,
    /// In load order; symbol lookup searches them front to back.
    libraries: Vec<Library>,
    externs: HashMap<&'a str, &'a ExternFunction<'a>>,
    memory: MemoryTracker,
}

impl<'a> FfiRegistry<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self {
            arena,
            libraries: Vec::new(),
            externs: HashMap::new(),
            memory: MemoryTracker::new(),
        }
    }

    /// Loads `path` once; later calls with the same path are no-ops.
    pub fn load_library(&mut self, path: &str) -> Result<(), FfiError> {
        if self.is_loaded(path) {
            tracing::trace!(path, "library already loaded");
            return Ok(());
        }
        let library = Library::open(path)?;
        tracing::debug!(path, "loaded library");
        self.libraries.push(library);
        Ok(())
    }

    pub fn is_loaded(&self, path: &str) -> bool {
        self.libraries.iter().any(|lib| lib.path == path)
    }

    pub fn find_symbol(&self, name: &str) -> Option<usize> {
        self.libraries.iter().find_map(|lib| lib.symbol(name))
    }

    /// Resolves `symbol` and registers it under `name`. Nothing is recorded
    /// when the symbol cannot be found.
    pub fn declare_extern(
        &mut self,
        name: &str,
        symbol: &str,
        params: &[FfiType],
        ret: FfiType,
    ) -> Result<&'a ExternFunction<'a>, FfiError> {
        let address = self
            .find_symbol(symbol)
            .ok_or_else(|| FfiError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
        let ext = self.arena.alloc(ExternFunction {
            name: self.arena.alloc_str(name),
            symbol: self.arena.alloc_str(symbol),
            params: self.arena.alloc_slice_copy(params),
            ret,
            is_variadic: params.last() == Some(&FfiType::Variadic),
            address,
        });
        tracing::debug!(name, symbol, address, variadic = ext.is_variadic, "declared extern");
        self.externs.insert(ext.name, ext);
        Ok(ext)
    }

    /// Registers an extern bound to a known address.
    pub fn register(&mut self, ext: ExternFunction<'a>) -> &'a ExternFunction<'a> {
        let ext = self.arena.alloc(ext);
        self.externs.insert(ext.name, ext);
        ext
    }

    pub fn lookup(&self, name: &str) -> Option<&'a ExternFunction<'a>> {
        self.externs.get(name).copied()
    }

    pub fn memory(&self) -> &MemoryTracker {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryTracker {
        &mut self.memory
    }

    /// Marshals `args`, calls the native function and decodes its result.
    ///
    /// Fixed parameters are encoded by their declared type and variadic extras
    /// by their own value type.
    pub fn call(&mut self, ext: &ExternFunction<'a>, args: &[Value<'a>]) -> Result<Value<'a>, FfiError> {
        let fixed = ext.fixed_params();
        let count_ok = if ext.is_variadic {
            args.len() >= fixed.len()
        } else {
            args.len() == fixed.len()
        };
        if !count_ok {
            return Err(FfiError::ArgumentCount {
                expected: fixed.len(),
                found: args.len(),
            });
        }
        if args.len() > native::MAX_ARGS {
            return Err(FfiError::TooManyArguments {
                count: args.len(),
                max: native::MAX_ARGS,
            });
        }

        let mut slots: SmallVec<[i64; native::MAX_ARGS]> = SmallVec::new();
        for (i, arg) in args.iter().enumerate() {
            let ty = fixed
                .get(i)
                .copied()
                .unwrap_or_else(|| marshal::variadic_type(*arg));
            slots.push(marshal::encode_arg(*arg, ty, &mut self.memory)?);
        }

        tracing::trace!(name = ext.name, args = slots.len(), "foreign call");
        let raw = native::call_native(ext.address, &slots)?;
        Ok(marshal::decode_return(self.arena, raw, ext.ret))
    }
}
