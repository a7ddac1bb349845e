//! Calling into the C library through `link` and `extern`.
//!
//! Every test returns early when no libc can be loaded on the host.

use std::path::Path;

use aoxim_core::api::{Diagnostic, Engine, EngineOptions};
use aoxim_core::values::Value;
use bumpalo::Bump;
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;

const LIBC_CANDIDATES: &[&str] = &[
    "/lib/x86_64-linux-gnu/libc.so.6",
    "/lib/aarch64-linux-gnu/libc.so.6",
    "/lib64/libc.so.6",
    "/usr/lib/libc.so.6",
];

static LIBC: Lazy<Option<&'static str>> =
    Lazy::new(|| LIBC_CANDIDATES.iter().copied().find(|path| Path::new(path).exists()));

/// Runs `program` after linking libc, returning its value and diagnostics.
fn run_with_libc<'a>(arena: &'a Bump, program: &str) -> Option<(Value<'a>, Vec<Diagnostic>)> {
    let libc = (*LIBC)?;
    let mut engine = Engine::new(arena, EngineOptions::default(), |_, _| {});
    let mut diagnostics = Vec::new();
    let source = format!("link \"{libc}\"\n{program}");
    let value = engine
        .run("<ffi>", &source, &mut |d| diagnostics.push(d.clone()))
        .unwrap();
    Some((value, diagnostics))
}

#[test]
fn test_strlen() {
    let arena = Bump::new();
    let Some((value, diagnostics)) = run_with_libc(
        &arena,
        "extern strlen = strlen(string): long\nstrlen(\"hello, world\")",
    ) else {
        return;
    };
    assert_eq!(diagnostics, vec![]);
    assert_eq!(value, Value::Int(12));
}

#[test]
fn test_integer_arguments() {
    let arena = Bump::new();
    let Some((value, _)) = run_with_libc(
        &arena,
        "extern abs = abs(int): int\nextern toupper = toupper(int): int\n(abs(0 - 7), toupper(97))",
    ) else {
        return;
    };
    assert_eq!(value.to_string(), "(7, 65)");
}

#[test]
fn test_string_comparison() {
    let arena = Bump::new();
    let Some((value, _)) = run_with_libc(
        &arena,
        indoc::indoc! {r#"
            extern strcmp = strcmp(string, string): int
            (strcmp("abc", "abc") == 0, strcmp("abc", "abd") < 0)
        "#},
    ) else {
        return;
    };
    assert_eq!(value.to_string(), "(True, True)");
}

#[test]
fn test_string_return() {
    let arena = Bump::new();
    let Some((value, _)) = run_with_libc(
        &arena,
        indoc::indoc! {r#"
            extern strchr = strchr(string, int): string
            strchr("key=value", 61)
        "#},
    ) else {
        return;
    };
    assert_eq!(value, Value::Str("=value"));
}

#[test]
fn test_native_writes_into_allocated_memory() {
    let arena = Bump::new();
    let Some((value, _)) = run_with_libc(
        &arena,
        indoc::indoc! {r#"
            extern memset = memset(ptr, int, long): ptr
            buf = alloc("char", 4)
            memset(buf, 120, 3)
            deref buf
        "#},
    ) else {
        return;
    };
    assert_eq!(value, Value::Char(b'x'));
}

#[test]
fn test_variadic_extern() {
    let arena = Bump::new();
    let Some((value, _)) = run_with_libc(
        &arena,
        indoc::indoc! {r#"
            extern snprintf = snprintf(ptr, long, string, $args): int
            buf = alloc("char", 32)
            n = snprintf(buf, 32, "%d-%s", 42, "x")
            n
        "#},
    ) else {
        return;
    };
    assert_eq!(value, Value::Int(4));
}

#[test]
fn test_wrong_argument_type_is_an_error_value() {
    let arena = Bump::new();
    let Some((value, _)) = run_with_libc(
        &arena,
        "extern strlen = strlen(string): long\nstrlen(5)",
    ) else {
        return;
    };
    assert_eq!(value, Value::Error("invalid argument type for FFI string parameter"));
}

#[test]
fn test_argument_count_mismatch() {
    let arena = Bump::new();
    let Some((value, _)) = run_with_libc(
        &arena,
        "extern abs = abs(int): int\nabs(1, 2)",
    ) else {
        return;
    };
    assert_eq!(value, Value::Error("extern function argument count mismatch"));
}

#[test]
fn test_extern_shadows_variable() {
    let arena = Bump::new();
    let Some((value, _)) = run_with_libc(
        &arena,
        "extern abs = abs(int): int\nabs = 3\nabs(0 - 2)",
    ) else {
        return;
    };
    assert_eq!(value, Value::Int(2));
}
