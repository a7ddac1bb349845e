//! Type tags used by `extern` declarations and raw pointers.

use std::fmt;

/// The declared type of a foreign parameter, return value or memory cell.
///
/// Every value crosses the native boundary as one 64-bit integer slot; the
/// tag only decides how an interpreter value is packed into that slot and how
/// the slot is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfiType {
    Int,
    Long,
    Char,
    Bool,
    Double,
    Float,
    Str,
    Ptr,
    Void,
    /// Trailing marker: the remaining arguments are typed from their values.
    Variadic,
    Any,
}

impl FfiType {
    /// Parse a type name as written in an `extern` declaration.
    /// Unknown names are treated as `void`.
    pub fn parse(name: &str) -> FfiType {
        match name {
            "int" => FfiType::Int,
            "long" => FfiType::Long,
            "char" => FfiType::Char,
            "bool" => FfiType::Bool,
            "double" => FfiType::Double,
            "float" => FfiType::Float,
            "string" => FfiType::Str,
            "ptr" => FfiType::Ptr,
            "void" => FfiType::Void,
            "$args" | "variadic" => FfiType::Variadic,
            "any" => FfiType::Any,
            _ => FfiType::Void,
        }
    }

    /// Bytes occupied by one cell of this type in raw memory.
    pub fn cell_size(self) -> usize {
        match self {
            FfiType::Char => 1,
            FfiType::Float => 4,
            FfiType::Void | FfiType::Variadic => 0,
            _ => 8,
        }
    }
}

impl fmt::Display for FfiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FfiType::Int => "int",
            FfiType::Long => "long",
            FfiType::Char => "char",
            FfiType::Bool => "bool",
            FfiType::Double => "double",
            FfiType::Float => "float",
            FfiType::Str => "string",
            FfiType::Ptr => "ptr",
            FfiType::Void => "void",
            FfiType::Variadic => "variadic",
            FfiType::Any => "any",
        };
        f.write_str(name)
    }
}
