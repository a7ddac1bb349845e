//! Built-in functions available to every program.
//!
//! Builtins are native functions bound as constants in the global scope
//! before user code runs:
//! - io: printing, assertions, `exit`, `help`
//! - convert: type conversions and type checks
//! - sequence: `len`, `range`, `tuple`
//! - pointer: pointer conversions and raw memory
//!
//! A builtin called with the wrong number of arguments returns an error value
//! rather than stopping the program.

use crate::api::{EnvironmentBuilder, Error};
use crate::evaluator::Evaluator;
use crate::values::Value;

pub mod convert;
pub mod io;
pub mod pointer;
pub mod sequence;

#[cfg(test)]
mod convert_test;
#[cfg(test)]
mod io_test;
#[cfg(test)]
mod pointer_test;

/// Register every builtin in the environment.
///
/// # Example
///
/// ```ignore
/// let engine = Engine::new(&arena, options, |_arena, env| {
///     register_stdlib(env).expect("stdlib registration should succeed");
/// });
/// ```
pub fn register_stdlib(env: &mut EnvironmentBuilder<'_>) -> Result<(), Error> {
    env.native("print", io::print)?;
    env.native("type", io::type_of)?;
    env.native("help", io::help)?;
    env.native("assert", io::assert)?;
    env.native("exit", io::exit)?;
    env.native("test", io::test)?;

    env.native("len", sequence::len)?;
    env.native("range", sequence::range)?;
    env.native("tuple", sequence::tuple)?;

    env.native("int", convert::int)?;
    env.native("double", convert::double)?;
    env.native("str", convert::str)?;
    env.native("bool", convert::bool)?;
    env.native("char", convert::char)?;
    env.native("any", convert::any)?;
    env.native("is_error", convert::is_error)?;
    env.native("is_null", convert::is_null)?;

    env.native("ptr_to_int", pointer::ptr_to_int)?;
    env.native("int_to_ptr", pointer::int_to_ptr)?;
    env.native("_store_ptr", pointer::store_ptr)?;
    env.native("alloc", pointer::alloc)?;

    Ok(())
}

/// Error value for a one-argument builtin called with the wrong count.
fn takes_one<'a>(evaluator: &Evaluator<'a>, name: &str) -> Value<'a> {
    evaluator.error(&format!("{name}() takes exactly 1 argument"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Engine, EngineOptions};
    use bumpalo::Bump;

    #[test]
    fn test_register_stdlib() {
        let arena = Bump::new();
        let engine = Engine::new(&arena, EngineOptions::default(), |_arena, _env| {});

        for name in ["print", "len", "int_to_ptr", "_store_ptr", "alloc"] {
            assert!(
                matches!(engine.global(name), Some(Value::Function(_))),
                "{name} should be registered"
            );
        }
    }

    #[test]
    fn test_builtins_are_const() {
        let arena = Bump::new();
        let mut engine = Engine::new(&arena, EngineOptions::default(), |_arena, _env| {});
        let result = engine.run("<test>", "print = 1", &mut |_| {}).unwrap();
        assert_eq!(result, Value::Error("cannot reassign const 'print'"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let arena = Bump::new();
        Engine::new(&arena, EngineOptions::default(), |_arena, env| {
            assert!(env.native("len", sequence::len).is_err());
        });
    }
}
