//! Formatting of runtime values for `print`, the REPL and interpolation.

use core::fmt::{self, Display, Formatter, Write};

use crate::values::{Pointer, Value};

impl<'a> Display for Value<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_value(f, *self, false, &mut Vec::new())
    }
}

impl<'a> Value<'a> {
    /// Text used by string interpolation and `str()`: strings and chars are
    /// inserted bare, everything else as displayed.
    pub fn to_text(&self) -> String {
        match self.unwrap_any() {
            Value::Str(s) => s.to_string(),
            Value::Char(c) => (c as char).to_string(),
            other => other.to_string(),
        }
    }

    /// How the REPL echoes a result: like `Display`, but a top-level string
    /// is quoted.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }
}

/// Strings are quoted only when `nested` inside a container. `open` holds the
/// lists and structs currently being written; meeting one again prints `...`.
fn write_value<'a>(
    f: &mut Formatter<'_>,
    value: Value<'a>,
    nested: bool,
    open: &mut Vec<usize>,
) -> fmt::Result {
    match value {
        Value::Int(i) => write!(f, "{i}"),
        Value::Double(d) => f.write_str(&format_double(d)),
        Value::Str(s) if nested => write!(f, "\"{s}\""),
        Value::Str(s) => f.write_str(s),
        Value::Char(c) if (0x20..0x7f).contains(&c) => write!(f, "'{}'", c as char),
        Value::Char(c) => write!(f, "'\\x{c:02x}'"),
        Value::Bool(true) => f.write_str("True"),
        Value::Bool(false) => f.write_str("False"),
        Value::Null => f.write_str("None"),
        Value::Error(message) => write!(f, "Error: {message}"),
        Value::Function(_) => f.write_str("<function>"),
        Value::Pointer(ptr) => write_pointer(f, ptr),
        Value::StructDef(def) => write!(f, "<struct {}>", def.name),
        Value::Struct(instance) => {
            f.write_str(instance.def.name)?;
            if instance.fields.is_empty() {
                return f.write_str(" {}");
            }
            let address = instance as *const _ as usize;
            if open.contains(&address) {
                return f.write_str(" {...}");
            }
            open.push(address);
            f.write_str(" { ")?;
            for (i, (name, field)) in instance.entries().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name}: ")?;
                write_value(f, field, true, open)?;
            }
            open.pop();
            f.write_str(" }")
        }
        Value::List(list) => {
            let address = list as *const _ as usize;
            if open.contains(&address) {
                return f.write_str("[...]");
            }
            open.push(address);
            f.write_char('[')?;
            write_sequence(f, &list.snapshot(), open)?;
            open.pop();
            f.write_char(']')
        }
        Value::Tuple(items) => {
            f.write_char('(')?;
            write_sequence(f, items, open)?;
            if items.len() == 1 {
                f.write_char(',')?;
            }
            f.write_char(')')
        }
        Value::Any(inner) => {
            f.write_str("<any:")?;
            write_value(f, *inner, true, open)?;
            f.write_char('>')
        }
    }
}

fn write_sequence<'a>(f: &mut Formatter<'_>, items: &[Value<'a>], open: &mut Vec<usize>) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_value(f, *item, true, open)?;
    }
    Ok(())
}

fn write_pointer(f: &mut Formatter<'_>, ptr: Pointer<'_>) -> fmt::Result {
    if ptr.is_null() {
        f.write_str("<ptr:nil>")
    } else {
        write!(f, "<ptr:{:#x}>", ptr.address())
    }
}

/// Formats a double like C's `%g`: six significant digits, trailing zeros
/// removed, scientific notation when the exponent is below -4 or at least 6.
pub fn format_double(d: f64) -> String {
    const PRECISION: i32 = 6;

    if d.is_nan() {
        return if d.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if d.is_infinite() {
        return if d < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if d == 0.0 {
        return if d.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // The exponent must be taken after rounding, so 999999.5 becomes 1e+06.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, d);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_fraction_zeros(mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (PRECISION - 1 - exponent).max(0) as usize;
        strip_fraction_zeros(&format!("{d:.decimals$}")).to_string()
    }
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
