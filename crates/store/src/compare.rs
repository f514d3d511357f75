//! Total ordering over [`Value`]s, following MongoDB's cross-type sort order.

use std::cmp::Ordering;

use document::{Document, Value};

/// Rank of each value type: null < numbers < strings < objects < arrays <
/// identifiers < booleans.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 1,
        Value::Int(_) | Value::Float(_) => 2,
        Value::String(_) => 3,
        Value::Object(_) => 4,
        Value::Array(_) => 5,
        Value::Id(_) => 7,
        Value::Bool(_) => 8,
    }
}

/// Compare two values the way the store sorts them. A missing field is
/// passed as `Value::Null`.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Id(x), Value::Id(y)) => x.bytes().cmp(&y.bytes()),
        (Value::Array(x), Value::Array(y)) => compare_seq(x, y),
        (Value::Object(x), Value::Object(y)) => compare_documents(x, y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => compare_numbers(x, y),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}

/// NaN sorts below every other number.
fn compare_numbers(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

fn compare_seq(x: &[Value], y: &[Value]) -> Ordering {
    for (a, b) in x.iter().zip(y) {
        let ord = compare_values(a, b);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    x.len().cmp(&y.len())
}

fn compare_documents(x: &Document, y: &Document) -> Ordering {
    for ((ka, va), (kb, vb)) in x.iter().zip(y.iter()) {
        let ord = compare_values(va, vb).then_with(|| ka.cmp(kb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    x.len().cmp(&y.len())
}
