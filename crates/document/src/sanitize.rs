//! JSON-safety transform for documents read back from the store.

use crate::value::{Document, Value};

/// Recursively rewrite `value` into a form every JSON encoder accepts.
///
/// Non-finite floats become `Null`, identifiers become their hex text, and
/// every other leaf passes through untouched. Containers keep their shape:
/// same keys in the same order, same elements in the same order.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(doc) => Value::Object(sanitize_document(doc)),
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::Float(f) if !f.is_finite() => Value::Null,
        Value::Id(id) => Value::String(id.to_hex()),
        Value::Null
        | Value::Bool(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::String(_) => value.clone(),
    }
}

/// Sanitize every field of `doc`, keeping its keys and their order.
pub fn sanitize_document(doc: &Document) -> Document {
    let mut out = Document::with_capacity(doc.len());
    for (k, v) in doc.iter() {
        out.push(k, sanitize(v));
    }
    out
}

/// Sanitize a result set into a single JSON array value.
pub fn sanitize_all<'a, I>(docs: I) -> Value
where
    I: IntoIterator<Item = &'a Document>,
{
    Value::Array(
        docs.into_iter()
            .map(|doc| Value::Object(sanitize_document(doc)))
            .collect(),
    )
}
