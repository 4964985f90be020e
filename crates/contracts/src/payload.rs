//! Payload - tagged union for structured event data

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ContractError;

/// Key used when a bare string payload is wrapped into an object
pub const TEXT_PAYLOAD_KEY: &str = "Message";

/// Structured data attached to an event.
///
/// Each variant has an explicit serialization rule:
/// - `Text` is wrapped into `{"Message": text}` so the serialized field is
///   always an object, never a bare string
/// - `Structured` is emitted as-is
/// - `Opaque` is emitted as-is (numbers, arrays, booleans, null)
/// - `Unserializable` records a conversion failure; formatting it yields the
///   fallback error event instead of the original record
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Structured(Map<String, Value>),
    Opaque(Value),
    Unserializable { reason: String },
}

impl Payload {
    /// Convert any `Serialize` value into a payload.
    ///
    /// Conversion failures are captured in `Payload::Unserializable`, never
    /// returned to the caller.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::from(value),
            Err(e) => Self::Unserializable {
                reason: e.to_string(),
            },
        }
    }

    /// JSON value placed under the payload field
    pub fn to_json(&self) -> Result<Value, ContractError> {
        match self {
            Payload::Text(text) => {
                let mut map = Map::with_capacity(1);
                map.insert(TEXT_PAYLOAD_KEY.to_string(), Value::String(text.clone()));
                Ok(Value::Object(map))
            }
            Payload::Structured(map) => Ok(Value::Object(map.clone())),
            Payload::Opaque(value) => Ok(value.clone()),
            Payload::Unserializable { reason } => Err(ContractError::Serialization {
                message: reason.clone(),
            }),
        }
    }

    /// Stable description of the payload's shape.
    ///
    /// Maps are described by their sorted top-level keys, everything else by
    /// the variant name.
    pub fn shape(&self) -> String {
        match self {
            Payload::Text(_) => TEXT_PAYLOAD_KEY.to_string(),
            Payload::Structured(map) => {
                let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
                keys.sort_unstable();
                keys.join(",")
            }
            Payload::Opaque(value) => match value {
                Value::Null => "null",
                Value::Bool(_) => "bool",
                Value::Number(_) => "number",
                Value::String(_) => "string",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            }
            .to_string(),
            Payload::Unserializable { .. } => "unserializable".to_string(),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Payload::Structured(map),
            Value::String(text) => Payload::Text(text),
            other => Payload::Opaque(other),
        }
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Payload::Structured(map)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_text_payload_is_wrapped() {
        let payload = Payload::from("hello world");
        assert_eq!(payload.to_json().unwrap(), json!({"Message": "hello world"}));
    }

    #[test]
    fn test_string_value_becomes_text() {
        let payload = Payload::from(json!("bare"));
        assert!(matches!(payload, Payload::Text(_)));
        assert!(payload.to_json().unwrap().is_object());
    }

    #[test]
    fn test_scalar_stays_opaque() {
        let payload = Payload::from(json!(42));
        assert_eq!(payload.to_json().unwrap(), json!(42));
    }

    #[test]
    fn test_from_serialize_failure_is_captured() {
        // Non-string map keys cannot become JSON object keys
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple key");

        let payload = Payload::from_serialize(&map);
        assert!(matches!(payload, Payload::Unserializable { .. }));
        assert!(payload.to_json().is_err());
    }

    #[test]
    fn test_shape_sorts_keys() {
        let a = Payload::from(json!({"b": 1, "a": 2}));
        let b = Payload::from(json!({"a": 9, "b": 8}));
        assert_eq!(a.shape(), "a,b");
        assert_eq!(a.shape(), b.shape());
    }
}
