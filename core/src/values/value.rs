//! Runtime values.
//!
//! `Value` is `Copy`. Scalars are stored inline; lists, tuples, structs and
//! functions are arena references, so copies of a container alias the same
//! storage and mutations through one binding are visible through all of them.

use std::cell::{Cell, Ref, RefCell};

use allocator_api2::vec::Vec as ArenaVec;
use bumpalo::Bump;
use hashbrown::{DefaultHashBuilder, HashMap};

use crate::ffi::FfiType;
use crate::scope::Binding;
use crate::values::Function;

#[derive(Clone, Copy)]
pub enum Value<'a> {
    Int(i64),
    Double(f64),
    Str(&'a str),
    Char(u8),
    Bool(bool),
    Null,
    Error(&'a str),
    Function(&'a Function<'a>),
    List(&'a List<'a>),
    Tuple(&'a [Value<'a>]),
    Pointer(Pointer<'a>),
    StructDef(&'a StructDef<'a>),
    Struct(&'a StructInstance<'a>),
    /// Never wraps another `Any`.
    Any(&'a Value<'a>),
}

impl<'a> Value<'a> {
    pub fn str(arena: &'a Bump, s: &str) -> Value<'a> {
        Value::Str(arena.alloc_str(s))
    }

    pub fn error(arena: &'a Bump, message: &str) -> Value<'a> {
        Value::Error(arena.alloc_str(message))
    }

    pub fn list(arena: &'a Bump, items: &[Value<'a>]) -> Value<'a> {
        Value::List(arena.alloc(List::new_in(arena, items)))
    }

    pub fn tuple(arena: &'a Bump, items: &[Value<'a>]) -> Value<'a> {
        Value::Tuple(arena.alloc_slice_copy(items))
    }

    pub fn function(arena: &'a Bump, function: Function<'a>) -> Value<'a> {
        Value::Function(arena.alloc(function))
    }

    pub fn null_ptr() -> Value<'a> {
        Value::Pointer(Pointer::Raw { addr: 0, tag: None })
    }

    /// Box a value. Boxing an already boxed value returns it unchanged.
    pub fn any(arena: &'a Bump, value: Value<'a>) -> Value<'a> {
        match value {
            Value::Any(_) => value,
            other => Value::Any(arena.alloc(other)),
        }
    }

    pub fn unwrap_any(self) -> Value<'a> {
        match self {
            Value::Any(inner) => *inner,
            other => other,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.unwrap_any() {
            Value::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self.unwrap_any() {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Null, errors, zero, empty strings and empty sequences are false.
    pub fn is_truthy(&self) -> bool {
        match *self {
            Value::Null | Value::Error(_) => false,
            Value::Bool(b) => b,
            Value::Int(i) => i != 0,
            Value::Double(d) => d != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Char(c) => c != 0,
            Value::List(list) => !list.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Pointer(ptr) => !ptr.is_null(),
            Value::Function(_) | Value::StructDef(_) | Value::Struct(_) => true,
            Value::Any(inner) => inner.is_truthy(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Char(_) => "char",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Error(_) => "error",
            Value::Function(_) => "function",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Pointer(_) => "ptr",
            Value::StructDef(_) => "struct_def",
            Value::Struct(_) => "struct",
            Value::Any(_) => "any",
        }
    }

    /// Equality used by `==`, `match` and `assert`.
    ///
    /// Values of different types are never equal; `any` is unwrapped first.
    /// Containers compare element-wise. Errors are never equal to anything.
    pub fn structurally_equal(&self, other: &Value<'a>) -> bool {
        equal_in(*self, *other, &mut Vec::new())
    }
}

/// `open` holds the pairs of lists or structs being compared further up. A
/// pair met again is unequal unless identical, so self-containing values
/// terminate.
fn equal_in<'a>(a: Value<'a>, b: Value<'a>, open: &mut Vec<(usize, usize)>) -> bool {
    match (a.unwrap_any(), b.unwrap_any()) {
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Double(a), Value::Double(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Char(a), Value::Char(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Null, Value::Null) => true,
        (Value::Pointer(a), Value::Pointer(b)) => a.address() == b.address(),
        (Value::Tuple(a), Value::Tuple(b)) => sequences_equal(a, b, open),
        (Value::List(a), Value::List(b)) => {
            if std::ptr::eq(a, b) {
                return true;
            }
            let pair = (a as *const _ as usize, b as *const _ as usize);
            if open.contains(&pair) {
                return false;
            }
            open.push(pair);
            let equal = sequences_equal(&a.items(), &b.items(), open);
            open.pop();
            equal
        }
        (Value::Struct(a), Value::Struct(b)) => {
            if std::ptr::eq(a, b) {
                return true;
            }
            if !std::ptr::eq(a.def, b.def) || a.fields.len() != b.fields.len() {
                return false;
            }
            let pair = (a as *const _ as usize, b as *const _ as usize);
            if open.contains(&pair) {
                return false;
            }
            open.push(pair);
            let equal = a
                .fields
                .iter()
                .zip(b.fields.iter())
                .all(|(x, y)| equal_in(x.get(), y.get(), open));
            open.pop();
            equal
        }
        (Value::Function(a), Value::Function(b)) => std::ptr::eq(a, b),
        (Value::StructDef(a), Value::StructDef(b)) => std::ptr::eq(a, b),
        _ => false,
    }
}

fn sequences_equal<'a>(a: &[Value<'a>], b: &[Value<'a>], open: &mut Vec<(usize, usize)>) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| equal_in(*x, *y, open))
}

/// Structural equality, except that two errors with the same message are equal.
impl<'a> PartialEq for Value<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => self.structurally_equal(other),
        }
    }
}

impl<'a> core::fmt::Debug for Value<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Double(d) => write!(f, "Double({d})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Char(c) => write!(f, "Char({:?})", *c as char),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Null => write!(f, "Null"),
            Value::Error(msg) => write!(f, "Error({msg:?})"),
            other => write!(f, "{}({})", other.type_name(), other),
        }
    }
}

/// A raw address or a reference to an interpreter variable.
#[derive(Clone, Copy)]
pub enum Pointer<'a> {
    /// A native address, optionally tagged with the type stored there.
    Raw { addr: usize, tag: Option<FfiType> },
    /// Produced by `&name`; dereferencing reads the live binding.
    Var(&'a Binding<'a>),
}

impl<'a> Pointer<'a> {
    pub fn address(&self) -> usize {
        match self {
            Pointer::Raw { addr, .. } => *addr,
            Pointer::Var(binding) => *binding as *const Binding<'a> as usize,
        }
    }

    pub fn is_null(&self) -> bool {
        self.address() == 0
    }
}

type Items<'a> = ArenaVec<Value<'a>, &'a Bump>;

/// Growable list whose storage lives in the arena.
pub struct List<'a> {
    items: RefCell<Items<'a>>,
}

impl<'a> List<'a> {
    pub fn new_in(arena: &'a Bump, values: &[Value<'a>]) -> Self {
        let mut items = ArenaVec::with_capacity_in(values.len(), arena);
        items.extend_from_slice(values);
        Self {
            items: RefCell::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value<'a>> {
        self.items.borrow().get(index).copied()
    }

    pub fn push(&self, value: Value<'a>) {
        self.items.borrow_mut().push(value);
    }

    pub fn pop(&self) -> Option<Value<'a>> {
        self.items.borrow_mut().pop()
    }

    /// Borrow the current elements. Do not hold the guard across evaluation,
    /// which may push to the same list.
    pub fn items(&self) -> Ref<'_, [Value<'a>]> {
        Ref::map(self.items.borrow(), |items| &items[..])
    }

    /// Copy of the current elements, safe to iterate while the list changes.
    pub fn snapshot(&self) -> Vec<Value<'a>> {
        self.items.borrow().to_vec()
    }
}

pub struct StructDef<'a> {
    pub name: &'a str,
    pub fields: &'a [&'a str],
    pub methods: HashMap<&'a str, &'a Function<'a>, DefaultHashBuilder, &'a Bump>,
}

impl<'a> StructDef<'a> {
    pub fn new(arena: &'a Bump, name: &'a str, fields: &'a [&'a str]) -> Self {
        Self {
            name,
            fields,
            methods: HashMap::new_in(arena),
        }
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| *field == name)
    }

    pub fn method(&self, name: &str) -> Option<&'a Function<'a>> {
        self.methods.get(name).copied()
    }

    /// A new instance with every field set to null.
    pub fn instantiate(&'a self, arena: &'a Bump) -> &'a StructInstance<'a> {
        let fields = arena.alloc_slice_fill_with(self.fields.len(), |_| Cell::new(Value::Null));
        arena.alloc(StructInstance { def: self, fields })
    }
}

pub struct StructInstance<'a> {
    pub def: &'a StructDef<'a>,
    /// One slot per field of `def`, in declaration order.
    pub fields: &'a [Cell<Value<'a>>],
}

impl<'a> StructInstance<'a> {
    pub fn get(&self, name: &str) -> Option<Value<'a>> {
        let index = self.def.field_index(name)?;
        Some(self.fields[index].get())
    }

    /// Returns false if the struct has no such field.
    pub fn set(&self, name: &str, value: Value<'a>) -> bool {
        match self.def.field_index(name) {
            Some(index) => {
                self.fields[index].set(value);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'a str, Value<'a>)> + '_ {
        self.def
            .fields
            .iter()
            .zip(self.fields.iter())
            .map(|(name, cell)| (*name, cell.get()))
    }
}
