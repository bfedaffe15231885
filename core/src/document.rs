//! Structured result document.
//!
//! In document routing mode every converted value is recorded under the
//! argument's match prefix. The first value for a key is stored as a
//! scalar; a second value promotes the entry to an ordered list, and every
//! later value is appended to it.

use serde::Serialize;
use serde_json::{Map, Value};

/// Key under which `%n` (argument index) values are recorded.
pub const ARG_INDEX_KEY: &str = "argi";

/// Insertion-ordered mapping from argument name to value or list of values.
///
/// # Examples
///
/// ```
/// use clargs_core::Document;
/// use serde_json::json;
///
/// let mut doc = Document::new();
/// doc.insert("-dims", json!(4));
/// assert_eq!(doc.get("-dims"), Some(&json!(4)));
///
/// doc.insert("-dims", json!(8));
/// doc.insert("-dims", json!(16));
/// assert_eq!(doc.get("-dims"), Some(&json!([4, 8, 16])));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    entries: Map<String, Value>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` under `key`, promoting an existing scalar to a list.
    pub fn insert(&mut self, key: &str, value: Value) {
        match self.entries.get_mut(key) {
            None => {
                self.entries.insert(key.to_string(), value);
            }
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }

    /// Returns the value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns `true` when `key` has been recorded.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in first-write order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the document, returning it as a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    /// Renders the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}
