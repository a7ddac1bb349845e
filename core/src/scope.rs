//! Variable bindings.
//!
//! Frames live in the arena and are chained outward through `parent`, so a
//! closure can hold `&'a Scope<'a>` and keep seeing later updates to the
//! frames it captured. Each name maps to a `Binding`, whose address is stable
//! for the lifetime of the arena; `&name` hands out that cell.

use core::cell::{Cell, RefCell};
use core::fmt;

use bumpalo::Bump;
use hashbrown::{DefaultHashBuilder, HashMap};
use thiserror::Error;

use crate::values::Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("cannot reassign const '{name}'")]
    ConstReassign { name: String },
}

pub struct Binding<'a> {
    pub name: &'a str,
    value: Cell<Value<'a>>,
    is_const: Cell<bool>,
}

impl<'a> Binding<'a> {
    pub fn get(&self) -> Value<'a> {
        self.value.get()
    }

    /// Writes the cell unconditionally. Const checks are the caller's job.
    pub fn set(&self, value: Value<'a>) {
        self.value.set(value);
    }

    pub fn is_const(&self) -> bool {
        self.is_const.get()
    }
}

impl fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("value", &self.value.get())
            .field("is_const", &self.is_const.get())
            .finish()
    }
}

type Bindings<'a> = HashMap<&'a str, &'a Binding<'a>, DefaultHashBuilder, &'a Bump>;

pub struct Scope<'a> {
    arena: &'a Bump,
    parent: Option<&'a Scope<'a>>,
    bindings: RefCell<Bindings<'a>>,
}

impl<'a> Scope<'a> {
    pub fn global(arena: &'a Bump) -> &'a Scope<'a> {
        arena.alloc(Scope {
            arena,
            parent: None,
            bindings: RefCell::new(HashMap::new_in(arena)),
        })
    }

    pub fn child(&'a self) -> &'a Scope<'a> {
        self.arena.alloc(Scope {
            arena: self.arena,
            parent: Some(self),
            bindings: RefCell::new(HashMap::new_in(self.arena)),
        })
    }

    /// The innermost binding for `name`, searching outward.
    pub fn binding(&self, name: &str) -> Option<&'a Binding<'a>> {
        let mut scope = self;
        loop {
            if let Some(binding) = scope.bindings.borrow().get(name) {
                return Some(*binding);
            }
            scope = scope.parent?;
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Value<'a>> {
        self.binding(name).map(Binding::get)
    }

    /// Updates the nearest binding of `name` in place, or creates one in this
    /// frame when no enclosing frame has it.
    pub fn assign(&self, name: &str, value: Value<'a>) -> Result<&'a Binding<'a>, ScopeError> {
        match self.binding(name) {
            Some(binding) if binding.is_const() => Err(ScopeError::ConstReassign {
                name: name.to_string(),
            }),
            Some(binding) => {
                binding.set(value);
                Ok(binding)
            }
            None => Ok(self.insert(name, value, false)),
        }
    }

    /// Binds `name` in this frame, replacing any binding the frame already has
    /// for it. Enclosing frames are untouched.
    pub fn define(&self, name: &str, value: Value<'a>, is_const: bool) -> &'a Binding<'a> {
        let existing = self.bindings.borrow().get(name).copied();
        match existing {
            Some(binding) => {
                binding.set(value);
                binding.is_const.set(is_const);
                binding
            }
            None => self.insert(name, value, is_const),
        }
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    fn insert(&self, name: &str, value: Value<'a>, is_const: bool) -> &'a Binding<'a> {
        let name = self.arena.alloc_str(name);
        let binding = self.arena.alloc(Binding {
            name,
            value: Cell::new(value),
            is_const: Cell::new(is_const),
        });
        self.bindings.borrow_mut().insert(name, binding);
        binding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_outward() {
        let arena = Bump::new();
        let global = Scope::global(&arena);
        global.define("x", Value::Int(1), false);
        let inner = global.child().child();
        assert_eq!(inner.lookup("x"), Some(Value::Int(1)));
        assert_eq!(inner.lookup("y"), None);
    }

    #[test]
    fn test_assign_updates_nearest_binding() {
        let arena = Bump::new();
        let global = Scope::global(&arena);
        global.define("x", Value::Int(1), false);
        let inner = global.child();

        inner.assign("x", Value::Int(2)).unwrap();
        assert_eq!(global.lookup("x"), Some(Value::Int(2)));
        assert!(!inner.contains_local("x"));

        inner.assign("fresh", Value::Int(3)).unwrap();
        assert!(inner.contains_local("fresh"));
        assert_eq!(global.lookup("fresh"), None);
    }

    #[test]
    fn test_define_shadows_outer_binding() {
        let arena = Bump::new();
        let global = Scope::global(&arena);
        global.define("x", Value::Int(1), false);
        let inner = global.child();
        inner.define("x", Value::Int(10), false);

        assert_eq!(inner.lookup("x"), Some(Value::Int(10)));
        assert_eq!(global.lookup("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_const_cannot_be_reassigned() {
        let arena = Bump::new();
        let global = Scope::global(&arena);
        global.define("limit", Value::Int(5), true);

        let err = global.child().assign("limit", Value::Int(6)).unwrap_err();
        assert_eq!(err.to_string(), "cannot reassign const 'limit'");
        assert_eq!(global.lookup("limit"), Some(Value::Int(5)));
    }

    #[test]
    fn test_binding_cell_is_stable() {
        let arena = Bump::new();
        let global = Scope::global(&arena);
        let first = global.define("x", Value::Int(1), false);
        global.assign("x", Value::Int(2)).unwrap();
        let again = global.define("x", Value::Int(3), false);

        assert!(core::ptr::eq(first, again));
        assert_eq!(first.get(), Value::Int(3));
    }
}
