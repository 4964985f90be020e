//! SerializedEvent - the unit that flows through delivery queues

use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;

use crate::ContractError;

/// Immutable JSON blob produced by the formatter.
///
/// Backed by `Bytes`, so fanning one event out to several sinks is a
/// reference-count increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedEvent(Bytes);

impl SerializedEvent {
    /// Wrap raw bytes (caller guarantees they hold one JSON object)
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Serialize a JSON value
    pub fn from_json(value: &Value) -> Result<Self, ContractError> {
        serde_json::to_vec(value)
            .map(|bytes| Self(Bytes::from(bytes)))
            .map_err(|e| ContractError::Serialization {
                message: e.to_string(),
            })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Cheap clone of the underlying buffer
    pub fn bytes(&self) -> Bytes {
        self.0.clone()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// UTF-8 view, if the content is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenate events into one JSON array body: `[e1,e2,...]`
    pub fn bundle(events: &[SerializedEvent]) -> Bytes {
        let capacity = events.iter().map(|e| e.len() + 1).sum::<usize>() + 2;
        let mut body = BytesMut::with_capacity(capacity);
        body.put_u8(b'[');
        for (idx, event) in events.iter().enumerate() {
            if idx > 0 {
                body.put_u8(b',');
            }
            body.put_slice(event.as_bytes());
        }
        body.put_u8(b']');
        body.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let event = SerializedEvent::from_json(&json!({"level": "Info"})).unwrap();
        assert_eq!(event.as_str(), Some(r#"{"level":"Info"}"#));
    }

    #[test]
    fn test_bundle_is_json_array() {
        let events = vec![
            SerializedEvent::new(r#"{"a":1}"#),
            SerializedEvent::new(r#"{"b":2}"#),
        ];
        let body = SerializedEvent::bundle(&events);
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed, json!([{"a": 1}, {"b": 2}]));
    }

    #[test]
    fn test_bundle_empty() {
        assert_eq!(&SerializedEvent::bundle(&[])[..], b"[]");
    }
}
