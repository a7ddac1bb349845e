use crate::values::{StructDef, Value};
use bumpalo::Bump;

#[test]
fn test_truthiness() {
    let arena = Bump::new();
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Error("boom").is_truthy());
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::Double(0.0).is_truthy());
    assert!(!Value::Str("").is_truthy());
    assert!(!Value::list(&arena, &[]).is_truthy());
    assert!(!Value::tuple(&arena, &[]).is_truthy());
    assert!(!Value::null_ptr().is_truthy());

    assert!(Value::Int(-1).is_truthy());
    assert!(Value::Str("0").is_truthy());
    assert!(Value::list(&arena, &[Value::Null]).is_truthy());
    assert!(Value::any(&arena, Value::Int(1)).is_truthy());
    assert!(!Value::any(&arena, Value::Int(0)).is_truthy());
}

#[test]
fn test_any_never_nests() {
    let arena = Bump::new();
    let once = Value::any(&arena, Value::Int(7));
    let twice = Value::any(&arena, once);
    match twice {
        Value::Any(inner) => assert!(matches!(inner, Value::Int(7))),
        other => panic!("expected any, got {:?}", other),
    }
    assert_eq!(twice.unwrap_any(), Value::Int(7));
}

#[test]
fn test_structural_equality_unwraps_any() {
    let arena = Bump::new();
    let boxed = Value::any(&arena, Value::Str("x"));
    assert!(boxed.structurally_equal(&Value::Str("x")));
    assert!(Value::Str("x").structurally_equal(&boxed));
}

#[test]
fn test_cross_type_values_are_not_equal() {
    assert!(!Value::Int(1).structurally_equal(&Value::Double(1.0)));
    assert!(!Value::Int(1).structurally_equal(&Value::Bool(true)));
    assert!(!Value::Null.structurally_equal(&Value::null_ptr()));
}

#[test]
fn test_containers_compare_element_wise() {
    let arena = Bump::new();
    let a = Value::list(&arena, &[Value::Int(1), Value::Str("two")]);
    let b = Value::list(&arena, &[Value::Int(1), Value::Str("two")]);
    let c = Value::list(&arena, &[Value::Int(1)]);
    assert!(a.structurally_equal(&b));
    assert!(!a.structurally_equal(&c));

    let t1 = Value::tuple(&arena, &[Value::Int(1), a]);
    let t2 = Value::tuple(&arena, &[Value::Int(1), b]);
    assert!(t1.structurally_equal(&t2));
}

#[test]
fn test_errors_are_never_structurally_equal() {
    let err = Value::Error("x");
    assert!(!err.structurally_equal(&err));
    // PartialEq is for tests and compares messages.
    assert_eq!(err, Value::Error("x"));
}

#[test]
fn test_list_aliases_share_mutations() {
    let arena = Bump::new();
    let list = Value::list(&arena, &[Value::Int(1)]);
    let alias = list;
    if let Value::List(items) = alias {
        items.push(Value::Int(2));
    }
    match list {
        Value::List(items) => assert_eq!(items.snapshot(), vec![Value::Int(1), Value::Int(2)]),
        other => panic!("expected list, got {:?}", other),
    }
}

#[test]
fn test_list_pop() {
    let arena = Bump::new();
    let Value::List(list) = Value::list(&arena, &[Value::Int(1), Value::Int(2)]) else {
        unreachable!()
    };
    assert_eq!(list.pop(), Some(Value::Int(2)));
    assert_eq!(list.pop(), Some(Value::Int(1)));
    assert_eq!(list.pop(), None);
    assert!(list.is_empty());
}

#[test]
fn test_struct_fields_default_to_null() {
    let arena = Bump::new();
    let fields = arena.alloc_slice_copy(&["a", "b"]);
    let def = arena.alloc(StructDef::new(&arena, "S", fields));
    let instance = def.instantiate(&arena);

    assert_eq!(instance.get("a"), Some(Value::Null));
    assert!(instance.set("b", Value::Int(5)));
    assert_eq!(instance.get("b"), Some(Value::Int(5)));
    assert!(!instance.set("missing", Value::Int(1)));
    assert_eq!(instance.get("missing"), None);
}

#[test]
fn test_struct_equality_requires_same_definition() {
    let arena = Bump::new();
    let fields = arena.alloc_slice_copy(&["v"]);
    let d1 = arena.alloc(StructDef::new(&arena, "A", fields));
    let d2 = arena.alloc(StructDef::new(&arena, "A", fields));

    let x = d1.instantiate(&arena);
    let y = d1.instantiate(&arena);
    let z = d2.instantiate(&arena);
    assert!(Value::Struct(x).structurally_equal(&Value::Struct(y)));
    assert!(!Value::Struct(x).structurally_equal(&Value::Struct(z)));
}

#[test]
fn test_type_names() {
    let arena = Bump::new();
    assert_eq!(Value::Int(1).type_name(), "int");
    assert_eq!(Value::Double(1.0).type_name(), "double");
    assert_eq!(Value::Str("").type_name(), "string");
    assert_eq!(Value::Char(b'c').type_name(), "char");
    assert_eq!(Value::null_ptr().type_name(), "ptr");
    assert_eq!(Value::tuple(&arena, &[]).type_name(), "tuple");
    assert_eq!(Value::any(&arena, Value::Int(1)).type_name(), "any");
}

#[test]
fn test_self_containing_lists_compare_without_looping() {
    let arena = Bump::new();
    let first = Value::list(&arena, &[Value::Int(1)]);
    let second = Value::list(&arena, &[Value::Int(1)]);
    for value in [first, second] {
        if let Value::List(list) = value {
            list.push(value);
        }
    }

    assert!(first.structurally_equal(&first));
    assert!(!first.structurally_equal(&second));
    assert!(!first.structurally_equal(&Value::list(&arena, &[Value::Int(1)])));
}
