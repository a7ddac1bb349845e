mod display;
mod function;
mod value;

pub use display::format_double;
pub use function::{Function, FunctionKind, NativeFn};
pub use value::{List, Pointer, StructDef, StructInstance, Value};

#[cfg(test)]
mod display_test;
#[cfg(test)]
mod value_test;
