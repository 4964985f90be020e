//! Logger - per-level API over formatter + registry

use std::sync::Arc;

use contracts::LogLevel;
use formatter::JsonFormatter;
use tracing::trace;

use crate::entry::Entry;
use crate::error::LoggerError;
use crate::registry::SinkRegistry;

/// Named logger writing to every sink of a registry.
///
/// Log calls never block on I/O and never fail; formatting problems become
/// fallback events and delivery problems stay inside the sinks.
#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
    registry: Arc<SinkRegistry>,
    formatter: Arc<JsonFormatter>,
    prefix_payload_type: bool,
    min_level: LogLevel,
}

impl Logger {
    pub fn new(
        context: impl Into<String>,
        registry: Arc<SinkRegistry>,
        formatter: Arc<JsonFormatter>,
    ) -> Self {
        Self {
            context: context.into(),
            registry,
            formatter,
            prefix_payload_type: true,
            min_level: LogLevel::Debug,
        }
    }

    /// Whether payload types, autogenerated ones included, become
    /// `<context>.<type>` (default true)
    pub fn with_prefix_payload_type(mut self, prefix: bool) -> Self {
        self.prefix_payload_type = prefix;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Drop records below `level`
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn level(&self) -> LogLevel {
        self.min_level
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn registry(&self) -> &Arc<SinkRegistry> {
        &self.registry
    }

    /// Logger for another context sharing this one's registry and settings
    pub fn child(&self, context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..self.clone()
        }
    }

    pub fn debug(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Debug, entry);
    }

    pub fn info(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Info, entry);
    }

    pub fn warning(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Warning, entry);
    }

    pub fn error(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Error, entry);
    }

    pub fn fatal(&self, entry: impl Into<Entry>) {
        self.log(LogLevel::Fatal, entry);
    }

    /// Single write path behind the per-level methods
    pub fn log(&self, level: LogLevel, entry: impl Into<Entry>) {
        if level < self.min_level {
            return;
        }

        let entry = entry.into();
        let payload_type = entry.payload_type().to_string();
        let record = entry.into_record(level, &self.context, payload_type);
        let events = self.formatter.format_with_prefix(&record, self.type_prefix());
        let accepted = self.registry.dispatch(&events);

        trace!(
            context = %self.context,
            level = %level,
            events = events.len(),
            accepted = accepted,
            "Record dispatched"
        );
    }

    /// Flush every sink of the registry
    pub async fn flush(&self) -> Result<(), LoggerError> {
        self.registry.flush_all().await
    }

    fn type_prefix(&self) -> Option<&str> {
        self.prefix_payload_type.then_some(self.context.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::MockSink;
    use formatter::FormatterOptions;
    use serde_json::json;

    fn logger_with_sink(context: &str) -> (Logger, Arc<MockSink>) {
        let sink = MockSink::named("mock");
        let registry = Arc::new(SinkRegistry::new());
        registry.register(sink.clone());
        let logger = Logger::new(context, registry, Arc::new(JsonFormatter::default()));
        (logger, sink)
    }

    #[test]
    fn test_math_operation_warning() {
        let (logger, sink) = logger_with_sink("Calc");
        logger.warning(Entry::typed("MathOperation", json!({"Div": 0, "Result": "NaN"})));

        let values = sink.values();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["level"], "Warning");
        assert_eq!(values[0]["context"], "Calc");
        assert_eq!(values[0]["payload_type"], "Calc.MathOperation");
        assert_eq!(values[0]["calc_math_operation"]["Div"], 0);
    }

    #[test]
    fn test_without_prefix() {
        let (logger, sink) = logger_with_sink("Calc");
        let logger = logger.with_prefix_payload_type(false);
        logger.warning(Entry::typed("MathOperation", json!({"Div": 0})));

        let values = sink.values();
        assert_eq!(values[0]["payload_type"], "MathOperation");
        assert!(values[0].get("math_operation").is_some());
    }

    #[test]
    fn test_min_level_filters() {
        let (mut logger, sink) = logger_with_sink("ctx");
        logger.set_level(LogLevel::Error);

        logger.debug("dropped");
        logger.info("dropped");
        logger.warning("dropped");
        logger.error("kept");
        logger.fatal("kept");

        let levels: Vec<String> = sink
            .values()
            .iter()
            .map(|v| v["level"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(levels, vec!["Error", "Fatal"]);
    }

    #[test]
    fn test_missing_payload_type_yields_advisory() {
        let (logger, sink) = logger_with_sink("ctx");
        logger.info(Entry::new().with_message("1").with_payload(json!({"stuff": 1})));

        let values = sink.values();
        assert_eq!(values.len(), 2);
        let qualified = values[0]["payload_type"].as_str().unwrap();
        assert!(qualified.starts_with("ctx.MissingPayloadType"));
        let placeholder = qualified.trim_start_matches("ctx.");
        assert!(values[1]["message"].as_str().unwrap().contains(placeholder));
        assert!(values[1].get("payload_type").is_none());
    }

    #[test]
    fn test_placeholder_unprefixed_when_prefix_disabled() {
        let (logger, sink) = logger_with_sink("ctx");
        let logger = logger.with_prefix_payload_type(false);
        logger.info(Entry::new().with_payload(json!({"stuff": 1})));

        let values = sink.values();
        assert!(values[0]["payload_type"]
            .as_str()
            .unwrap()
            .starts_with("MissingPayloadType"));
    }

    #[test]
    fn test_string_message_entry() {
        let (logger, sink) = logger_with_sink("ctx");
        logger.info("plain text");

        let values = sink.values();
        assert_eq!(values[0]["message"], "plain text");
        assert!(values[0].get("payload_type").is_none());
    }

    #[test]
    fn test_child_shares_registry() {
        let (logger, sink) = logger_with_sink("parent");
        logger.child("child").info("from child");

        assert_eq!(sink.values()[0]["context"], "child");
    }

    #[test]
    fn test_formatter_options_applied() {
        let sink = MockSink::named("mock");
        let registry = Arc::new(SinkRegistry::new());
        registry.register(sink.clone());
        let formatter = Arc::new(JsonFormatter::new(FormatterOptions {
            app_name: Some("calculator".into()),
            environment: Some("dev".into()),
        }));

        Logger::new("ctx", registry, formatter).info("hi");
        assert_eq!(sink.values()[0]["app_name"], "calculator");
        assert_eq!(sink.values()[0]["env"], "dev");
    }
}
