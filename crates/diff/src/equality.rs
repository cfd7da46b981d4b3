//! Structural equality with numeric tolerance
//!
//! Numbers closer than the configured precision are equal: the engine emits
//! no operation for them, so a reconstructed document keeps the older of two
//! "close enough" numbers. Integers (both sides representable as i64 or u64)
//! always compare exactly.

use serde_json::{Number, Value};

/// Compare two numbers under the precision policy
pub fn numbers_equal(a: &Number, b: &Number, precision: f64) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y || (x - y).abs() < precision,
        _ => false,
    }
}

/// Deep equality; object key order is irrelevant
pub fn values_equal(a: &Value, b: &Value, precision: f64) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y, precision),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y.iter())
                    .all(|(l, r)| values_equal(l, r, precision))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, l)| {
                    y.get(k)
                        .map_or(false, |r| values_equal(l, r, precision))
                })
        }
        _ => false,
    }
}
