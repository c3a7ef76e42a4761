//! Key equality shared by query filtering and grouping.
//!
//! Structural equality with one normalization: an integral float equals the
//! integer of the same value, so `1` and `1.0` name the same key. Object
//! member order never matters. Strings and numbers never compare equal.

use std::fmt::Write;

use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
enum NumKey {
    Int(i128),
    Float(f64),
}

// Beyond this magnitude every f64 is integral but no longer exact.
const INTEGRAL_LIMIT: f64 = 1e36;

fn num_key(n: &Number) -> NumKey {
    if let Some(i) = n.as_i64() {
        return NumKey::Int(i as i128);
    }
    if let Some(u) = n.as_u64() {
        return NumKey::Int(u as i128);
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    if f.fract() == 0.0 && f.abs() < INTEGRAL_LIMIT {
        NumKey::Int(f as i128)
    } else {
        NumKey::Float(f)
    }
}

pub fn keys_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => num_key(x) == num_key(y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| keys_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| keys_equal(x, y)))
        }
        _ => false,
    }
}

/// A string that is identical for two keys exactly when [`keys_equal`]
/// holds between them.
pub(crate) fn canonical(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push('n'),
        Value::Bool(true) => out.push('t'),
        Value::Bool(false) => out.push('f'),
        Value::Number(n) => {
            let _ = match num_key(n) {
                NumKey::Int(i) => write!(out, "#{i}"),
                NumKey::Float(f) => write!(out, "#{f:?}"),
            };
        }
        Value::String(s) => write_str(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_str(k, out);
                out.push(':');
                write_canonical(v, out);
            }
            out.push('}');
        }
    }
}

fn write_str(s: &str, out: &mut String) {
    let _ = write!(out, "{s:?}");
}
