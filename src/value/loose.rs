//! Loose value comparison
//!
//! Result rows arrive as untyped scalars, and filter literals are always text.
//! Comparisons between them follow one fixed set of rules:
//!
//! - `null` and `bool` operands compare as booleans, except `null` against a
//!   string, where `null` is the empty string
//! - numbers compare numerically with numbers and with numeric strings
//! - two numeric strings compare numerically (`"10" > "9"`)
//! - any other string pair compares bytewise
//! - a number against a non-numeric string compares the number's text bytewise
//! - arrays and objects are never ordered against anything

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::{Number, Value};

/// Parses a numeric string.
///
/// Accepts optional surrounding whitespace, an optional sign, digits with an
/// optional fraction (`"5."` and `".5"` included) and an optional exponent.
/// `inf`, `nan` and hex literals are not numeric.
pub fn numeric(s: &str) -> Option<f64> {
    let (value, consumed) = numeric_prefix(s)?;
    if s[consumed..].chars().all(is_php_space) {
        Some(value)
    } else {
        None
    }
}

/// Parses the longest numeric prefix of `s` (after leading whitespace).
///
/// Returns the value and the number of bytes consumed.
fn numeric_prefix(s: &str) -> Option<(f64, usize)> {
    let bytes = s.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() && is_php_space(bytes[pos] as char) {
        pos += 1;
    }
    let start = pos;

    if pos < bytes.len() && (bytes[pos] == b'+' || bytes[pos] == b'-') {
        pos += 1;
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut digits = pos - int_start;

    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        let frac_digits = frac_end - frac_start;
        if digits + frac_digits > 0 {
            digits += frac_digits;
            pos = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp = pos + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let exp_digits_start = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits_start {
            pos = exp;
        }
    }

    s[start..pos].parse::<f64>().ok().map(|v| (v, pos))
}

fn is_php_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0B' | '\x0C')
}

fn number(n: &Number) -> f64 {
    n.as_f64().unwrap_or(0.0)
}

/// Renders a number the way result rows render it as text.
///
/// Integral floats drop their fraction (`5.0` renders as `"5"`).
fn number_text(n: &Number) -> String {
    if n.is_f64() {
        let f = number(n);
        if f.fract() == 0.0 && f.abs() < 1e15 {
            return format!("{}", f as i64);
        }
    }
    n.to_string()
}

/// Truthiness of a value.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => number(n) != 0.0,
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Renders a value as text: `null` is `""`, `true` is `"1"`, `false` is `""`.
pub fn to_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::Bool(true) => Cow::Borrowed("1"),
        Value::Bool(false) => Cow::Borrowed(""),
        Value::Number(n) => Cow::Owned(number_text(n)),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Coerces a value to an integer.
///
/// Strings contribute their leading numeric prefix (`"12abc"` is 12, `"abc"`
/// is 0), floats truncate toward zero.
pub fn to_int(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n.as_i64().unwrap_or_else(|| number(n).trunc() as i64),
        Value::String(s) => numeric_prefix(s).map(|(v, _)| v.trunc() as i64).unwrap_or(0),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(_) => 1,
    }
}

/// Loose equality.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => a == b,
        _ => loose_cmp(a, b) == Some(Ordering::Equal),
    }
}

/// Loose ordering. `None` when the operands are not ordered against each other.
pub fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => None,

        (Value::Null, Value::Null) => Some(Ordering::Equal),

        (Value::Bool(_), _) | (_, Value::Bool(_)) => Some(truthy(a).cmp(&truthy(b))),

        (Value::Null, Value::String(s)) => Some("".cmp(s.as_str())),
        (Value::String(s), Value::Null) => Some(s.as_str().cmp("")),

        (Value::Null, _) | (_, Value::Null) => Some(truthy(a).cmp(&truthy(b))),

        (Value::Number(x), Value::Number(y)) => number(x).partial_cmp(&number(y)),

        (Value::Number(x), Value::String(s)) => match numeric(s) {
            Some(y) => number(x).partial_cmp(&y),
            None => Some(number_text(x).as_str().cmp(s.as_str())),
        },
        (Value::String(s), Value::Number(y)) => match numeric(s) {
            Some(x) => x.partial_cmp(&number(y)),
            None => Some(s.as_str().cmp(number_text(y).as_str())),
        },

        (Value::String(x), Value::String(y)) => match (numeric(x), numeric(y)) {
            (Some(xf), Some(yf)) => xf.partial_cmp(&yf),
            _ => Some(x.as_bytes().cmp(y.as_bytes())),
        },
    }
}
