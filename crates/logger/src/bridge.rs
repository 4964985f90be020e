//! TracingBridge - forwards foreign `tracing` events to the sinks

use std::fmt;
use std::sync::Arc;

use contracts::{EventRecord, LogLevel, Payload};
use formatter::JsonFormatter;
use serde_json::{Map, Number, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::registry::SinkRegistry;

/// Payload type of records produced from foreign events
pub const EXTERNAL_PAYLOAD_TYPE: &str = "ExternalLoggerMessage";

/// Targets never forwarded: the pipeline's own diagnostics and its HTTP stack
const PIPELINE_TARGETS: [&str; 10] = [
    "dispatcher",
    "logger",
    "formatter",
    "observability",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
    "wiremock",
];

/// `tracing_subscriber` layer turning events from other libraries into
/// records: context is the event target, the message is the event message,
/// remaining fields form the payload.
pub struct TracingBridge {
    registry: Arc<SinkRegistry>,
    formatter: Arc<JsonFormatter>,
    min_level: LogLevel,
}

impl TracingBridge {
    pub fn new(registry: Arc<SinkRegistry>, formatter: Arc<JsonFormatter>) -> Self {
        Self {
            registry,
            formatter,
            min_level: LogLevel::Debug,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Record for one foreign event, or `None` when it must not be forwarded
    fn to_record(&self, event: &Event<'_>) -> Option<EventRecord> {
        let metadata = event.metadata();
        if is_pipeline_target(metadata.target()) {
            return None;
        }

        let level = map_level(*metadata.level());
        if level < self.min_level {
            return None;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut record = EventRecord::new(level, metadata.target(), EXTERNAL_PAYLOAD_TYPE)
            .with_message(visitor.message.unwrap_or_default());
        if !visitor.fields.is_empty() {
            record = record.with_payload(Payload::Structured(visitor.fields));
        }
        Some(record)
    }
}

impl<S> Layer<S> for TracingBridge
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if let Some(record) = self.to_record(event) {
            let events = self.formatter.format(&record);
            self.registry.dispatch(&events);
        }
    }
}

fn is_pipeline_target(target: &str) -> bool {
    PIPELINE_TARGETS.iter().any(|prefix| {
        target == *prefix
            || target
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

fn map_level(level: Level) -> LogLevel {
    match level {
        Level::TRACE | Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warning,
        Level::ERROR => LogLevel::Error,
    }
}

/// Collects event fields into a JSON map
#[derive(Default)]
struct FieldVisitor {
    fields: Map<String, Value>,
    message: Option<String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let value = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), Value::Number(value.into()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::Bool(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.fields.insert(field.name().to_string(), value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields
            .insert(field.name().to_string(), Value::String(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::MockSink;
    use tracing_subscriber::layer::SubscriberExt;

    fn bridged() -> (tracing::subscriber::DefaultGuard, Arc<MockSink>) {
        let sink = MockSink::named("mock");
        let registry = Arc::new(SinkRegistry::new());
        registry.register(sink.clone());

        let bridge = TracingBridge::new(registry, Arc::new(JsonFormatter::default()));
        let subscriber = tracing_subscriber::registry().with(bridge);
        (tracing::subscriber::set_default(subscriber), sink)
    }

    #[test]
    fn test_foreign_event_forwarded() {
        let (_guard, sink) = bridged();

        tracing::warn!(target: "payments::gateway", attempt = 3, retryable = true, "Gateway slow");

        let values = sink.values();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["level"], "Warning");
        assert_eq!(values[0]["context"], "payments::gateway");
        assert_eq!(values[0]["message"], "Gateway slow");
        assert_eq!(values[0]["payload_type"], EXTERNAL_PAYLOAD_TYPE);
        assert_eq!(values[0]["external_logger_message"]["attempt"], 3);
        assert_eq!(values[0]["external_logger_message"]["retryable"], true);
    }

    #[test]
    fn test_pipeline_targets_skipped() {
        let (_guard, sink) = bridged();

        tracing::info!(target: "dispatcher::transmitter", "internal");
        tracing::info!(target: "reqwest::connect", "internal");
        tracing::info!(target: "dispatcherx", "forwarded");

        let values = sink.values();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["context"], "dispatcherx");
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(map_level(Level::TRACE), LogLevel::Debug);
        assert_eq!(map_level(Level::WARN), LogLevel::Warning);
        assert_eq!(map_level(Level::ERROR), LogLevel::Error);
    }
}
