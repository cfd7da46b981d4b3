//! JSON document value
//!
//! `JsonValue` is a newtype around `serde_json::Value`. It is the unit the
//! diff engine compares and the unit a version's content reconstructs to.
//!
//! Objects are backed by serde_json's ordered map (keys sorted), so
//! [`JsonValue::to_json_string`] is a canonical compact rendering: two
//! structurally equal documents always serialize to the same text. Stored
//! content and checksums are computed over this canonical text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use crate::error::{Error, Result};

/// JSON value wrapper
///
/// # Examples
///
/// ```
/// use vellum_core::JsonValue;
///
/// let doc: JsonValue = r#"{"b": 2, "a": 1}"#.parse().unwrap();
/// assert!(doc.is_object());
/// assert_eq!(doc.to_json_string(), r#"{"a":1,"b":2}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct JsonValue(serde_json::Value);

impl JsonValue {
    /// Create a null JSON value
    pub fn null() -> Self {
        JsonValue(serde_json::Value::Null)
    }

    /// Create an empty JSON object
    pub fn object() -> Self {
        JsonValue(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Create an empty JSON array
    pub fn array() -> Self {
        JsonValue(serde_json::Value::Array(Vec::new()))
    }

    /// Create from a serde_json::Value
    pub fn from_value(value: serde_json::Value) -> Self {
        JsonValue(value)
    }

    /// Parse JSON text, reporting malformed input as a validation error
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map(JsonValue)
            .map_err(|e| Error::validation(format!("invalid JSON: {}", e)))
    }

    /// Get the underlying serde_json::Value
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    /// Get a reference to the underlying serde_json::Value
    pub fn as_inner(&self) -> &serde_json::Value {
        &self.0
    }

    /// Get a mutable reference to the underlying serde_json::Value
    pub fn as_inner_mut(&mut self) -> &mut serde_json::Value {
        &mut self.0
    }

    /// Serialize to canonical compact JSON text
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    /// Serialize to pretty JSON string
    pub fn to_json_string_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.to_json_string())
    }

    /// Size of the canonical text in bytes
    pub fn size_bytes(&self) -> usize {
        self.to_json_string().len()
    }

    /// Maximum nesting depth; 0 for primitives
    pub fn nesting_depth(&self) -> usize {
        fn depth_of(value: &serde_json::Value) -> usize {
            match value {
                serde_json::Value::Array(arr) => 1 + arr.iter().map(depth_of).max().unwrap_or(0),
                serde_json::Value::Object(obj) => 1 + obj.values().map(depth_of).max().unwrap_or(0),
                _ => 0,
            }
        }
        depth_of(&self.0)
    }

    /// Short type name used in error messages and diff summaries
    pub fn type_name(&self) -> &'static str {
        value_type_name(&self.0)
    }
}

/// Type name of a raw serde_json value
pub fn value_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl FromStr for JsonValue {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_str(s).map(JsonValue)
    }
}

impl Deref for JsonValue {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for JsonValue {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Default is null
impl Default for JsonValue {
    fn default() -> Self {
        Self::null()
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(v: serde_json::Value) -> Self {
        JsonValue(v)
    }
}

impl From<JsonValue> for serde_json::Value {
    fn from(v: JsonValue) -> Self {
        v.0
    }
}

impl From<bool> for JsonValue {
    fn from(v: bool) -> Self {
        JsonValue(serde_json::Value::Bool(v))
    }
}

impl From<i64> for JsonValue {
    fn from(v: i64) -> Self {
        JsonValue(serde_json::Value::Number(v.into()))
    }
}

impl From<f64> for JsonValue {
    fn from(v: f64) -> Self {
        JsonValue(
            serde_json::Number::from_f64(v)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
        )
    }
}

impl From<&str> for JsonValue {
    fn from(v: &str) -> Self {
        JsonValue(serde_json::Value::String(v.to_string()))
    }
}

impl From<String> for JsonValue {
    fn from(v: String) -> Self {
        JsonValue(serde_json::Value::String(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_text_sorts_keys() {
        let a = JsonValue::parse(r#"{"z": 1, "a": {"y": true, "b": null}}"#).unwrap();
        let b = JsonValue::parse(r#"{"a": {"b": null, "y": true}, "z": 1}"#).unwrap();
        assert_eq!(a.to_json_string(), b.to_json_string());
        assert_eq!(a.to_json_string(), r#"{"a":{"b":null,"y":true},"z":1}"#);
    }

    #[test]
    fn test_parse_invalid_is_validation_error() {
        let err = JsonValue::parse("{\"a\": ").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(JsonValue::from(1i64).nesting_depth(), 0);
        assert_eq!(JsonValue::from(json!([1, [2, [3]]])).nesting_depth(), 3);
        assert_eq!(JsonValue::from(json!({"a": {"b": {}}})).nesting_depth(), 3);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(JsonValue::null().type_name(), "null");
        assert_eq!(JsonValue::from("s").type_name(), "string");
        assert_eq!(JsonValue::array().type_name(), "array");
        assert_eq!(JsonValue::object().type_name(), "object");
    }

    #[test]
    fn test_from_f64_nan_is_null() {
        assert!(JsonValue::from(f64::NAN).is_null());
    }

    #[test]
    fn test_serde_transparent() {
        let v = JsonValue::from(json!({"a": [1, 2]}));
        let text = serde_json::to_string(&v).unwrap();
        assert_eq!(text, r#"{"a":[1,2]}"#);
        let back: JsonValue = serde_json::from_str(&text).unwrap();
        assert_eq!(back, v);
    }
}
