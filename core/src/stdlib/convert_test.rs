use bumpalo::Bump;
use pretty_assertions::assert_eq;

use crate::test_utils::Runner;
use crate::values::Value;

#[test]
fn test_int_conversions() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("int(3.9)"), Value::Int(3));
    assert_eq!(runner.eval("int(-3.9)"), Value::Int(-3));
    assert_eq!(runner.eval("int(True)"), Value::Int(1));
    assert_eq!(runner.eval(r#"int("  42")"#), Value::Int(42));
    assert_eq!(runner.eval(r#"int(char("A"))"#), Value::Int(65));
    assert_eq!(
        runner.eval(r#"int("forty")"#),
        Value::Error("cannot convert string to int: invalid format")
    );
    assert_eq!(runner.eval("int([1])"), Value::Error("cannot convert to int"));
    assert_eq!(runner.eval("int(1, 2)"), Value::Error("int() takes exactly 1 argument"));
}

#[test]
fn test_double_conversions() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("double(2)"), Value::Double(2.0));
    assert_eq!(runner.eval(r#"double("2.5")"#), Value::Double(2.5));
    assert_eq!(runner.eval("double(False)"), Value::Double(0.0));
    assert_eq!(
        runner.eval(r#"double("x")"#),
        Value::Error("cannot convert string to double: invalid format")
    );
    assert_eq!(runner.eval("double(nullptr)"), Value::Error("cannot convert to double"));
}

#[test]
fn test_str_conversions() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("str(12)"), Value::Str("12"));
    assert_eq!(runner.eval("str(0.1)"), Value::Str("0.1"));
    assert_eq!(runner.eval("str(True)"), Value::Str("True"));
    assert_eq!(runner.eval("str(missing)"), Value::Str("None"));
    assert_eq!(runner.eval(r#"str(char("z"))"#), Value::Str("z"));
    assert_eq!(runner.eval("str(any(7))"), Value::Str("7"));
    assert_eq!(runner.eval("str([1, 2])"), Value::Error("cannot convert to string"));
}

#[test]
fn test_bool_uses_truthiness() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("bool(0)"), Value::Bool(false));
    assert_eq!(runner.eval(r#"bool("")"#), Value::Bool(false));
    assert_eq!(runner.eval("bool([])"), Value::Bool(false));
    assert_eq!(runner.eval("bool(nullptr)"), Value::Bool(false));
    assert_eq!(runner.eval("bool(0.5)"), Value::Bool(true));
    assert_eq!(runner.eval("bool((0, 0))"), Value::Bool(true));
}

#[test]
fn test_char_conversions() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("char(65)"), Value::Char(b'A'));
    assert_eq!(runner.eval(r#"char("hello")"#), Value::Char(b'h'));
    assert_eq!(runner.eval("char(256)"), Value::Error("char() requires value 0-255"));
    assert_eq!(runner.eval("char(-1)"), Value::Error("char() requires value 0-255"));
    assert_eq!(
        runner.eval(r#"char("")"#),
        Value::Error("cannot convert empty string to char")
    );
    assert_eq!(runner.eval("char(65)").to_string(), "'A'");
}

#[test]
fn test_type_checks() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("is_error(1 / 0)"), Value::Bool(true));
    assert_eq!(runner.eval("is_error(any(1 / 0))"), Value::Bool(true));
    assert_eq!(runner.eval("is_error(0)"), Value::Bool(false));
    assert_eq!(runner.eval("is_null(missing)"), Value::Bool(true));
    assert_eq!(runner.eval("is_null(nullptr)"), Value::Bool(true));
    assert_eq!(runner.eval("is_null(int_to_ptr(8))"), Value::Bool(false));
    assert_eq!(runner.eval("is_null(0)"), Value::Bool(false));
}

#[test]
fn test_type_names() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    runner.eval("struct P { x }");
    let cases = [
        ("type(1)", "int"),
        ("type(1.5)", "double"),
        (r#"type("s")"#, "string"),
        ("type(True)", "bool"),
        ("type(missing)", "null"),
        ("type([])", "list"),
        ("type((1, 2))", "tuple"),
        ("type(print)", "function"),
        ("type(nullptr)", "ptr"),
        ("type(P { x: 1 })", "struct"),
        ("type(any(1))", "any"),
        ("type(1 / 0)", "error"),
    ];
    for (source, expected) in cases {
        assert_eq!(runner.eval(source), Value::Str(expected), "{source}");
    }
}
