//! Numeric literal classification and conversion.

use crate::value::Value;

/// Convert a numeric literal to `Int` or `Float`.
///
/// Returns `None` when the literal does not match
/// `-? (0 | [1-9][0-9]*) (\.[0-9]+)? ([eE][+-]?[0-9]+)?` or when its magnitude
/// overflows a double.
pub(crate) fn parse_number(literal: &str) -> Option<Value> {
    let bytes = literal.as_bytes();
    let mut i = 0;

    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => i = skip_digits(bytes, i + 1),
        _ => return None,
    }

    let mut is_float = false;
    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        i = skip_digits(bytes, frac_start);
        if i == frac_start {
            return None;
        }
        is_float = true;
    }
    if let Some(b'e' | b'E') = bytes.get(i) {
        i += 1;
        if let Some(b'+' | b'-') = bytes.get(i) {
            i += 1;
        }
        let exp_start = i;
        i = skip_digits(bytes, exp_start);
        if i == exp_start {
            return None;
        }
        is_float = true;
    }
    // Anything left over (a second '.', a digit after a leading zero, a stray
    // sign) is malformed.
    if i != bytes.len() {
        return None;
    }

    if !is_float {
        if let Ok(n) = literal.parse::<i64>() {
            return Some(Value::Int(n));
        }
    }
    let f: f64 = literal.parse().ok()?;
    f.is_finite().then_some(Value::Float(f))
}

fn skip_digits(bytes: &[u8], mut i: usize) -> usize {
    while let Some(b'0'..=b'9') = bytes.get(i) {
        i += 1;
    }
    i
}
