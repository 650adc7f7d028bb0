//! Coercion of raw values into the shapes mappers ask for

use crate::{Error, Object, Result, Value};

/// Name of a value's JSON kind, for messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render a scalar as a string. Numbers and booleans are formatted;
/// null, arrays and objects have no string form.
pub fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a value as an integer, accepting numeric strings.
/// Floats are truncated toward zero.
pub fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read a value as a boolean, accepting `"true"` and `"false"`.
pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            s if s.eq_ignore_ascii_case("true") => Some(true),
            s if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Coerce a value into an object; anything that is not an object becomes
/// an empty one.
pub fn to_object(value: Value) -> Object {
    match value {
        Value::Object(map) => map,
        _ => Object::new(),
    }
}

/// Like [`to_object`], but reports values of the wrong shape.
pub fn try_into_object(value: Value) -> Result<Object> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::not_an_object(&other)),
    }
}
