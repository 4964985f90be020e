//! JsonFormatter - EventRecord to canonical JSON

use chrono::Utc;
use contracts::{ContractError, EventRecord, LogLevel, Payload, SerializedEvent};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::exception::ExceptionInfo;
use crate::naming::field_name;

/// Prefix of autogenerated payload types
pub const MISSING_PAYLOAD_TYPE_PREFIX: &str = "MissingPayloadType";

/// Keys the formatter owns; a payload field never overwrites them
const RESERVED_KEYS: [&str; 8] = [
    "timestamp",
    "level",
    "context",
    "payload_type",
    "message",
    "exception_info",
    "app_name",
    "env",
];

/// Serialized form of the fallback event, used if even that fails
const FALLBACK_LITERAL: &str = r#"{"context":"Logging.Error","level":"Fatal","message":"Could not unwrap log entry.","payload_type":"UnwrapError"}"#;

/// Fields stamped on every event
#[derive(Debug, Clone, Default)]
pub struct FormatterOptions {
    /// Emitted as `app_name`
    pub app_name: Option<String>,
    /// Emitted as `env`
    pub environment: Option<String>,
}

/// Turns records into serialized JSON objects
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    options: FormatterOptions,
}

impl JsonFormatter {
    pub fn new(options: FormatterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    /// Format a record.
    ///
    /// Returns one event, or two when the record carries a payload without a
    /// payload type: the record under an autogenerated type name, followed
    /// by an advisory record naming it. Never fails; a record that cannot be
    /// serialized is replaced by the fallback error event.
    pub fn format(&self, record: &EventRecord) -> Vec<SerializedEvent> {
        self.format_with_prefix(record, None)
    }

    /// Like [`format`](Self::format), with the emitted payload type
    /// (autogenerated ones included) written as `<prefix>.<type>`.
    ///
    /// The advisory record names the unprefixed placeholder.
    pub fn format_with_prefix(
        &self,
        record: &EventRecord,
        type_prefix: Option<&str>,
    ) -> Vec<SerializedEvent> {
        match record.payload() {
            Some(payload) if record.payload_type().is_empty() => {
                let placeholder = placeholder_payload_type(payload);
                let advisory = EventRecord::new(record.level(), record.context(), "")
                    .with_message(advisory_message(&placeholder));

                vec![
                    self.format_single(record, &qualify(type_prefix, &placeholder)),
                    self.format_single(&advisory, ""),
                ]
            }
            _ => {
                let payload_type = qualify(type_prefix, record.payload_type());
                vec![self.format_single(record, &payload_type)]
            }
        }
    }

    /// Build the JSON object for a record under the given payload type
    pub fn to_value(&self, record: &EventRecord, payload_type: &str) -> Result<Value, ContractError> {
        let mut dto = Map::new();
        dto.insert(
            "timestamp".to_string(),
            Value::String(record.timestamp().to_rfc3339()),
        );
        dto.insert(
            "level".to_string(),
            Value::String(record.level().as_str().to_string()),
        );
        dto.insert(
            "context".to_string(),
            Value::String(record.context().to_string()),
        );

        if !payload_type.is_empty() {
            dto.insert(
                "payload_type".to_string(),
                Value::String(payload_type.to_string()),
            );

            if let Some(payload) = record.payload() {
                dto.insert(payload_field_name(payload_type), payload.to_json()?);
            }
        }

        if !record.message().is_empty() {
            dto.insert(
                "message".to_string(),
                Value::String(record.message().to_string()),
            );
        }

        if let Some(exception) = record.exception() {
            let info = ExceptionInfo::from_captured(exception);
            let value = serde_json::to_value(&info).map_err(|e| ContractError::Serialization {
                message: e.to_string(),
            })?;
            dto.insert("exception_info".to_string(), value);
        }

        if let Some(app_name) = &self.options.app_name {
            dto.insert("app_name".to_string(), Value::String(app_name.clone()));
        }
        if let Some(environment) = &self.options.environment {
            dto.insert("env".to_string(), Value::String(environment.clone()));
        }

        Ok(Value::Object(dto))
    }

    fn format_single(&self, record: &EventRecord, payload_type: &str) -> SerializedEvent {
        let result = self
            .to_value(record, payload_type)
            .and_then(|value| SerializedEvent::from_json(&value));

        match result {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    context = %record.context(),
                    payload_type = %payload_type,
                    error = %e,
                    "Could not serialize log entry, emitting fallback event"
                );
                fallback_event(&e.to_string())
            }
        }
    }
}

/// Event substituted for a record that cannot be serialized
pub(crate) fn fallback_event(reason: &str) -> SerializedEvent {
    let value = json!({
        "timestamp": Utc::now().to_rfc3339(),
        "message": "Could not unwrap log entry.",
        "level": LogLevel::Fatal.as_str(),
        "context": "Logging.Error",
        "payload_type": "UnwrapError",
        "logging_error": reason,
    });

    SerializedEvent::from_json(&value).unwrap_or_else(|_| SerializedEvent::new(FALLBACK_LITERAL))
}

/// Deterministic type name for a payload logged without one.
///
/// The suffix is derived from the payload's shape, so payloads of the same
/// shape land under the same field.
fn placeholder_payload_type(payload: &Payload) -> String {
    let digest = format!("{:x}", md5::compute(payload.shape().as_bytes()));
    format!("{MISSING_PAYLOAD_TYPE_PREFIX}{}", &digest[..8])
}

fn qualify(prefix: Option<&str>, payload_type: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() && !payload_type.is_empty() => {
            format!("{prefix}.{payload_type}")
        }
        _ => payload_type.to_string(),
    }
}

fn advisory_message(placeholder: &str) -> String {
    format!(
        "The previous message lacks a payload type, but appends payload. \
         Autogenerated payload type {placeholder}. Add a payload type."
    )
}

fn payload_field_name(payload_type: &str) -> String {
    let name = field_name(payload_type);
    if RESERVED_KEYS.contains(&name.as_str()) {
        format!("{name}_payload")
    } else {
        name
    }
}
