use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

use crate::test_utils::Runner;
use crate::values::Value;

#[test]
fn test_pointer_integer_conversions() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(runner.eval("ptr_to_int(int_to_ptr(4096))"), Value::Int(4096));
    assert_eq!(runner.eval("ptr_to_int(nullptr)"), Value::Int(0));
    assert_eq!(runner.eval("int_to_ptr(255)").to_string(), "<ptr:0xff>");
    assert_eq!(runner.eval("int_to_ptr(0)").to_string(), "<ptr:nil>");
    assert_eq!(
        runner.eval("ptr_to_int(5)"),
        Value::Error("ptr_to_int() requires a pointer argument")
    );
    assert_eq!(
        runner.eval("int_to_ptr(1.5)"),
        Value::Error("int_to_ptr() requires an integer argument")
    );
    assert_eq!(
        runner.eval("int_to_ptr(1, 2)"),
        Value::Error("int_to_ptr() type must be a string")
    );
}

#[test]
fn test_alloc_returns_zeroed_typed_memory() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    runner.eval(r#"d = alloc("double")"#);
    assert_eq!(runner.eval("deref d"), Value::Double(0.0));
    assert_eq!(runner.eval("_store_ptr(d, 2.5)"), Value::Double(2.5));
    assert_eq!(runner.eval("deref d"), Value::Double(2.5));

    runner.eval(r#"n = alloc("int", 4)"#);
    runner.eval("_store_ptr(n, 3.9)");
    assert_eq!(runner.eval("deref n"), Value::Int(3));
    assert_eq!(runner.engine.evaluator().ffi().memory().len(), 2);
}

#[test]
fn test_alloc_errors() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(
        runner.eval(r#"alloc("int", 0)"#),
        Value::Error("alloc() count must be a positive int")
    );
    assert_eq!(runner.eval("alloc(4)"), Value::Error("alloc() type must be a string"));
    assert_eq!(
        runner.eval(r#"alloc("void")"#),
        Value::Error("cannot allocate values of type void")
    );
    assert_eq!(runner.eval("alloc()"), Value::Error("alloc() takes 1 or 2 arguments"));
}

#[test]
fn test_typed_pointer_reads_through_tag() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    let result = runner.eval(indoc! {r#"
        cell = alloc("char", 8)
        _store_ptr(cell, 104)
        c = int_to_ptr(ptr_to_int(cell), "char")
        deref c
    "#});
    assert_eq!(result, Value::Char(b'h'));
}

#[test]
fn test_string_cells() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    runner.eval(r#"s = alloc("string")"#);
    assert_eq!(runner.eval("deref s"), Value::Null);
    runner.eval(r#"_store_ptr(s, "stored")"#);
    assert_eq!(runner.eval("deref s"), Value::Str("stored"));
}

#[test]
fn test_store_through_variable_pointer() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    runner.eval("count = 1\np = &count");
    runner.eval("_store_ptr(p, count + 1)");
    assert_eq!(runner.eval("count"), Value::Int(2));

    runner.eval("const fixed = 1\nq = &fixed");
    assert_eq!(
        runner.eval("_store_ptr(q, 2)"),
        Value::Error("cannot reassign const 'fixed'")
    );
    assert_eq!(runner.eval("fixed"), Value::Int(1));
}

#[test]
fn test_store_errors() {
    let arena = Bump::new();
    let mut runner = Runner::new(&arena);
    assert_eq!(
        runner.eval("_store_ptr(nullptr, 1)"),
        Value::Error("cannot store to null pointer")
    );
    assert_eq!(
        runner.eval("_store_ptr(1, 1)"),
        Value::Error("first argument must be a pointer")
    );
    assert_eq!(
        runner.eval("_store_ptr(nullptr)"),
        Value::Error("_store_ptr() takes exactly 2 arguments (ptr, value)")
    );
}
