//! Tests for Display on Value - what `print` and the REPL show.

use crate::values::{StructDef, Value, format_double};
use bumpalo::Bump;

#[test]
fn test_display_int() {
    assert_eq!(format!("{}", Value::Int(42)), "42");
    assert_eq!(format!("{}", Value::Int(-100)), "-100");
    assert_eq!(format!("{}", Value::Int(0)), "0");
}

#[test]
fn test_display_double_uses_six_significant_digits() {
    assert_eq!(format_double(3.14), "3.14");
    assert_eq!(format_double(42.0), "42");
    assert_eq!(format_double(0.1 + 0.2), "0.3");
    assert_eq!(format_double(1.0 / 3.0), "0.333333");
    assert_eq!(format_double(123456.0), "123456");
    assert_eq!(format_double(-2.5), "-2.5");
}

#[test]
fn test_display_double_exponent_form() {
    assert_eq!(format_double(1234567.0), "1.23457e+06");
    assert_eq!(format_double(999999.5), "1e+06");
    assert_eq!(format_double(0.0001), "0.0001");
    assert_eq!(format_double(0.00001), "1e-05");
    assert_eq!(format_double(1e100), "1e+100");
}

#[test]
fn test_display_double_special_values() {
    assert_eq!(format_double(0.0), "0");
    assert_eq!(format_double(f64::INFINITY), "inf");
    assert_eq!(format_double(f64::NEG_INFINITY), "-inf");
    assert_eq!(format_double(f64::NAN), "nan");
}

#[test]
fn test_display_scalars() {
    assert_eq!(Value::Bool(true).to_string(), "True");
    assert_eq!(Value::Bool(false).to_string(), "False");
    assert_eq!(Value::Null.to_string(), "None");
    assert_eq!(Value::Char(b'a').to_string(), "'a'");
    assert_eq!(Value::Char(b'\n').to_string(), "'\\x0a'");
    assert_eq!(Value::Error("division by zero").to_string(), "Error: division by zero");
}

#[test]
fn test_display_strings_quoted_only_inside_containers() {
    let arena = Bump::new();
    assert_eq!(Value::Str("hi").to_string(), "hi");

    let list = Value::list(&arena, &[Value::Str("a"), Value::Int(1)]);
    assert_eq!(list.to_string(), "[\"a\", 1]");

    let boxed = Value::any(&arena, Value::Str("x"));
    assert_eq!(boxed.to_string(), "<any:\"x\">");
}

#[test]
fn test_display_tuples() {
    let arena = Bump::new();
    let pair = Value::tuple(&arena, &[Value::Int(1), Value::Double(2.5)]);
    assert_eq!(pair.to_string(), "(1, 2.5)");

    let single = Value::tuple(&arena, &[Value::Int(1)]);
    assert_eq!(single.to_string(), "(1,)");

    assert_eq!(Value::tuple(&arena, &[]).to_string(), "()");
}

#[test]
fn test_display_nested_list() {
    let arena = Bump::new();
    let inner = Value::list(&arena, &[Value::Int(2), Value::Int(3)]);
    let outer = Value::list(&arena, &[Value::Int(1), inner, Value::list(&arena, &[])]);
    assert_eq!(outer.to_string(), "[1, [2, 3], []]");
}

#[test]
fn test_display_structs() {
    let arena = Bump::new();
    let fields = arena.alloc_slice_copy(&["x", "name"]);
    let def = arena.alloc(StructDef::new(&arena, "Point", fields));
    let point = def.instantiate(&arena);
    point.set("x", Value::Int(3));
    point.set("name", Value::Str("p"));

    assert_eq!(Value::StructDef(def).to_string(), "<struct Point>");
    assert_eq!(Value::Struct(point).to_string(), "Point { x: 3, name: \"p\" }");

    let unit = arena.alloc(StructDef::new(&arena, "Unit", &[]));
    assert_eq!(Value::Struct(unit.instantiate(&arena)).to_string(), "Unit {}");
}

#[test]
fn test_display_pointers() {
    assert_eq!(Value::null_ptr().to_string(), "<ptr:nil>");
    let ptr = Value::Pointer(crate::values::Pointer::Raw {
        addr: 0x1000,
        tag: None,
    });
    assert_eq!(ptr.to_string(), "<ptr:0x1000>");
}

#[test]
fn test_to_text_inserts_strings_and_chars_bare() {
    let arena = Bump::new();
    assert_eq!(Value::Str("abc").to_text(), "abc");
    assert_eq!(Value::Char(b'z').to_text(), "z");
    assert_eq!(Value::any(&arena, Value::Str("boxed")).to_text(), "boxed");
    assert_eq!(Value::Double(1.5).to_text(), "1.5");
}

#[test]
fn test_repr_quotes_top_level_strings() {
    assert_eq!(Value::Str("hi").repr(), "\"hi\"");
    assert_eq!(Value::Int(3).repr(), "3");
    assert_eq!(Value::Char(b'a').repr(), "'a'");
}

#[test]
fn test_display_self_containing_list() {
    let arena = Bump::new();
    let value = Value::list(&arena, &[Value::Int(1)]);
    let Value::List(list) = value else {
        panic!("expected a list");
    };
    list.push(value);
    assert_eq!(value.to_string(), "[1, [...]]");

    let outer = Value::list(&arena, &[value, value]);
    assert_eq!(outer.to_string(), "[[1, [...]], [1, [...]]]");
}
