//! Output and program control: `print`, `type`, `help`, `assert`, `test`,
//! `exit`.

use std::io::Write;

use crate::evaluator::{Evaluator, ExecutionError};
use crate::values::Value;

use super::takes_one;

/// `print(...)`.
///
/// When the first argument is a string with at least one `%` placeholder and
/// enough arguments follow it, each `%` is replaced by the next argument.
/// Otherwise all arguments are printed separated by spaces.
pub fn print<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let line = format_print(args);
    let out = evaluator.output();
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(Value::Null)
}

/// The line `print` writes for `args`, without the newline.
pub fn format_print(args: &[Value<'_>]) -> String {
    if let [Value::Str(format), rest @ ..] = args
        && !rest.is_empty()
    {
        let placeholders = count_placeholders(format);
        if placeholders > 0 && placeholders <= rest.len() {
            return substitute(format, rest);
        }
    }

    let mut line = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&arg.to_string());
    }
    line
}

fn count_placeholders(format: &str) -> usize {
    let mut count = 0;
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if chars.peek() == Some(&'%') {
                chars.next();
            } else {
                count += 1;
            }
        }
    }
    count
}

fn substitute(format: &str, args: &[Value<'_>]) -> String {
    let mut line = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            line.push(c);
        } else if chars.peek() == Some(&'%') {
            chars.next();
            line.push('%');
        } else if let Some(arg) = args.next() {
            line.push_str(&arg.to_string());
        } else {
            line.push('%');
        }
    }
    line
}

/// `type(v)`: the type name of `v`.
pub fn type_of<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [arg] = args else {
        return Ok(takes_one(evaluator, "type"));
    };
    Ok(Value::Str(arg.type_name()))
}

/// `exit()` or `exit(code)`. Stops the program.
pub fn exit<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    match args {
        [] => Err(ExecutionError::Exit(0)),
        [code] => match code.as_int() {
            Some(code) => Err(ExecutionError::Exit(code as i32)),
            None => Ok(evaluator.error("exit() expects an int")),
        },
        _ => Ok(evaluator.error("exit() takes at most 1 argument")),
    }
}

/// `assert(cond)` or `assert(actual, expected)`.
pub fn assert<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let holds = match args {
        [cond] => cond.is_truthy(),
        [actual, expected] => actual.structurally_equal(expected),
        _ => return Ok(evaluator.error("assert() takes 1 or 2 arguments")),
    };
    if !holds {
        tracing::debug!(?args, "assertion failed");
        return Err(ExecutionError::AssertionFailed("Assertion failed".to_string()));
    }
    Ok(Value::Int(0))
}

/// `test(actual, expected)`: prints `Ok` or `Fail` and returns whether the
/// two are equal.
pub fn test<'a>(evaluator: &mut Evaluator<'a>, args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let [actual, expected] = args else {
        return Ok(evaluator.error("test() takes exactly 2 arguments"));
    };
    let passed = actual.structurally_equal(expected);
    let out = evaluator.output();
    writeln!(out, "{}", if passed { "Ok" } else { "Fail" })?;
    out.flush()?;
    Ok(Value::Bool(passed))
}

const HELP: &str = r#"
=== Built-in Functions ===
print(...)     - Print values
                 Supports % placeholders: print("Value: %", x)
type(x)        - Get type of value
assert(...)    - Assert a condition, or that two values are equal
test(a, b)     - Print Ok or Fail depending on a == b
exit(...)      - Exit with exit code
len(obj)       - Get length
range(...)     - Create range list
tuple(...)     - Create tuple
any(x)         - Wrap value in any type
help()         - This message

=== Type Conversion ===
int(x)         - Convert to integer
double(x)      - Convert to double
str(x)         - Convert to string
bool(x)        - Convert to boolean
char(x)        - Convert to char
is_error(x)    - Check if value is error
is_null(x)     - Check if value is null/NULL pointer

=== Pointer Operations ===
ptr_to_int(p)          - Convert pointer to integer
int_to_ptr(i[, type])  - Convert integer to pointer, optionally typed
alloc(type[, n])       - Allocate zeroed memory for n values of type
_store_ptr(p, v)       - Write v through pointer p
&x, deref p            - Address of a variable, read through a pointer

=== FFI (Foreign Function Interface) ===
link "lib.so"   - Load C shared library
extern f = c_func(int, string): int - Declare C function
  Supported types: int, double, string, void, ptr, long, float, char, bool, any
  A trailing $args accepts extra arguments typed from their values

=== String Interpolation ===
Method 1 - {var} syntax: "Hello {name}"
Method 2 - % placeholder: print("Hello %", name)
  Use {{ }} and %% to escape braces and percent signs

=== Syntax ===
x = 10                   - Variable
const pi = 3.14          - Constant variable
f(x) = x * 2             - Function
lambda x: x * 2          - Lambda expression
import "file.calc"       - Import file
nums = [1, 2, 3]         - List literal
point = (10, 20)         - Tuple literal
struct P { x, y }        - Struct definition
p = P { x: 1, y: 2 }     - Struct literal
match v: { 1: "one" }    - Pattern match
"#;

/// `help()`: prints a summary of builtins and syntax.
pub fn help<'a>(evaluator: &mut Evaluator<'a>, _args: &[Value<'a>]) -> Result<Value<'a>, ExecutionError> {
    let out = evaluator.output();
    writeln!(out, "{HELP}")?;
    out.flush()?;
    Ok(Value::Null)
}
