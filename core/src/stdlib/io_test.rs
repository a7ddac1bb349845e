use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::api::Error;
use crate::test_utils::Runner;
use crate::values::Value;

use super::io::format_print;

#[test]
fn test_print_separates_arguments_with_spaces() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval(r#"print("a", 1, 2.5, [1, "b"])"#), Value::Null);
    assert_eq!(runner.output(), "a 1 2.5 [1, \"b\"]\n");
}

#[test]
fn test_print_placeholders() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    runner.eval(r#"print("x = %, y = %", 1, 2)"#);
    runner.eval(r#"print("%% of %", 5)"#);
    runner.eval(r#"print("100%")"#);
    assert_eq!(runner.output(), "x = 1, y = 2\n% of 5\n100%\n");
}

#[test]
fn test_format_print_needs_enough_arguments() {
    // Too few arguments for the placeholders: printed as plain values
    assert_eq!(
        format_print(&[Value::Str("% and %"), Value::Int(1)]),
        "% and % 1"
    );
    // Extra arguments beyond the placeholders are dropped
    assert_eq!(
        format_print(&[Value::Str("only %"), Value::Int(1), Value::Int(2)]),
        "only 1"
    );
    assert_eq!(format_print(&[]), "");
}

#[test]
fn test_print_interpolated_string() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    runner.eval(indoc! {r#"
        name = "world"
        print("hello {name}, {{literal}}")
    "#});
    assert_eq!(runner.output(), "hello world, {literal}\n");
}

#[test]
fn test_help_lists_builtins() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("help()"), Value::Null);
    let output = runner.output();
    assert!(output.contains("=== Built-in Functions ==="));
    assert!(output.contains("int_to_ptr(i[, type])"));
}

#[test]
fn test_exit() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert!(matches!(runner.run("exit(3)"), Err(Error::Exit { code: 3 })));
    assert!(matches!(runner.run("exit()"), Err(Error::Exit { code: 0 })));
    assert_eq!(runner.eval(r#"exit("no")"#), Value::Error("exit() expects an int"));
}

#[test]
fn test_exit_stops_remaining_statements() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    let result = runner.run(indoc! {r#"
        print("before")
        exit(2)
        print("after")
    "#});
    assert!(matches!(result, Err(Error::Exit { code: 2 })));
    assert_eq!(runner.output(), "before\n");
}

#[test]
fn test_assert() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("assert(1 < 2)"), Value::Int(0));
    assert_eq!(runner.eval("assert([1, (2, 3)], [1, (2, 3)])"), Value::Int(0));
    assert!(matches!(
        runner.run("assert(1, 2)"),
        Err(Error::AssertionFailed { .. })
    ));
    assert!(matches!(
        runner.run("assert(False)"),
        Err(Error::AssertionFailed { .. })
    ));
    assert_eq!(runner.eval("assert()"), Value::Error("assert() takes 1 or 2 arguments"));
}

#[test]
fn test_test_reports_outcome() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("test(1 + 1, 2)"), Value::Bool(true));
    assert_eq!(runner.eval(r#"test("a", "b")"#), Value::Bool(false));
    assert_eq!(runner.eval("test(1)"), Value::Error("test() takes exactly 2 arguments"));
    assert_eq!(runner.output(), "Ok\nFail\n");
}

#[test]
fn test_type_arity() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("type()"), Value::Error("type() takes exactly 1 argument"));
}

#[test]
fn test_sequence_builtins() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("len([1, 2, 3])"), Value::Int(3));
    assert_eq!(runner.eval("len((1, 2))"), Value::Int(2));
    assert_eq!(runner.eval(r#"len("héllo")"#), Value::Int(5));
    assert_eq!(runner.eval("len(5)"), Value::Null);

    assert_eq!(runner.eval("range(3)").to_string(), "[0, 1, 2]");
    assert_eq!(runner.eval("range(2, 5)").to_string(), "[2, 3, 4]");
    assert_eq!(runner.eval("range(10, 0, -3)").to_string(), "[10, 7, 4, 1]");
    assert_eq!(runner.eval("range(0, 5, 0)").to_string(), "[]");
    assert_eq!(runner.eval(r#"range("a")"#), Value::Null);

    assert_eq!(runner.eval("tuple(1, \"a\")").to_string(), "(1, \"a\")");
    assert_eq!(runner.eval("tuple(1)").to_string(), "(1,)");
}
