//! Value types for opsh's AST and runtime.
//!
//! Supports primitives (null, bool, int, float, string), structured record
//! data (maps and arrays as `serde_json::Value`), resolved type descriptors,
//! wrapped dynamic objects, and bound member handles.

use crate::descriptor::TypeDescriptor;
use crate::object::ShellObject;

/// A runtime value.
///
/// `Object` carries a shared handle: cloning the value aliases the same
/// instance. Everything else is plain data.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Structured record data (hashtables, arrays, nested structures).
    Record(serde_json::Value),
    /// A resolved runtime type, produced by a type literal.
    Type(TypeDescriptor),
    /// A wrapped dynamic object. Reference semantics.
    Object(ShellObject),
    /// A member handle obtained from an object, invocable later.
    Method(BoundMethod),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            // Objects compare by identity, matching their aliasing semantics.
            (Value::Object(a), Value::Object(b)) => a.same_instance(b),
            (Value::Method(a), Value::Method(b)) => a == b,
            _ => false,
        }
    }
}

/// A member handle bound to a target value.
///
/// Produced when a method member is read rather than invoked
/// (`$m = $obj.ToUpper`). Its own `Invoke` member applies arguments to the
/// bound member on the captured target.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundMethod {
    /// The value the member was read from.
    pub target: Box<Value>,
    /// The member name to invoke on the target.
    pub name: String,
}

impl BoundMethod {
    /// Bind `name` on `target`.
    pub fn new(target: Value, name: impl Into<String>) -> Self {
        Self {
            target: Box::new(target),
            name: name.into(),
        }
    }
}

/// Render a value the way the default output formatter displays it.
///
/// Null renders as the empty string; booleans use `True`/`False` casing.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Record(json) => display_json(json),
        Value::Type(descriptor) => descriptor.full_name(),
        Value::Object(object) => {
            let underlying = object.underlying();
            if matches!(underlying, Value::Null) {
                display_added_members(object)
            } else {
                display_value(&underlying)
            }
        }
        Value::Method(method) => method.name.clone(),
    }
}

/// Format the added note properties of an object with no underlying value.
fn display_added_members(object: &ShellObject) -> String {
    let notes = object.added_notes();
    if notes.is_empty() {
        return String::new();
    }
    let body = notes
        .iter()
        .map(|(name, value)| format!("{}={}", name, display_value(value)))
        .collect::<Vec<_>>()
        .join("; ");
    format!("@{{{body}}}")
}

fn display_json(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(display_json)
            .collect::<Vec<_>>()
            .join("\n"),
        serde_json::Value::Object(map) => {
            let body = map
                .iter()
                .map(|(k, v)| format!("{}={}", k, display_json(v)))
                .collect::<Vec<_>>()
                .join("; ");
            format!("@{{{body}}}")
        }
    }
}

/// Convert a value to JSON for storage inside a record.
///
/// Objects and methods have no faithful JSON form and degrade to their
/// display text.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Record(json) => json.clone(),
        other => serde_json::Value::String(display_value(other)),
    }
}

/// Convert JSON back into a value. Maps and arrays stay as records.
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        other => Value::Record(other.clone()),
    }
}
