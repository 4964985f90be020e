//! Sink implementations and the config-driven factory

mod console;
mod delivery;

use std::sync::Arc;

use contracts::{EventSink, SinkConfig, SinkType};
use tracing::instrument;

pub use self::console::ConsoleSink;
pub use self::delivery::{DeliveryConfig, DeliverySink};

use crate::error::DispatcherError;
use crate::metrics::SinkMetrics;
use crate::transmitter::DeliveryMode;
use crate::transport::ReqwestTransport;

/// A running sink plus a handle on its counters
#[derive(Clone)]
pub struct BuiltSink {
    pub sink: Arc<dyn EventSink>,
    pub metrics: Arc<SinkMetrics>,
}

impl BuiltSink {
    pub fn name(&self) -> &str {
        self.sink.name()
    }
}

/// Delivery mode of an HTTP sink type, `None` for console
pub fn delivery_mode(sink_type: SinkType) -> Option<DeliveryMode> {
    match sink_type {
        SinkType::Console => None,
        SinkType::Simple => Some(DeliveryMode::Simple),
        SinkType::Batching => Some(DeliveryMode::Batching),
        SinkType::Bundling => Some(DeliveryMode::Bundling),
    }
}

/// Create a sink from configuration (requires a tokio runtime)
#[instrument(
    name = "dispatcher_build_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub fn build_sink(config: &SinkConfig) -> Result<BuiltSink, DispatcherError> {
    let Some(mode) = delivery_mode(config.sink_type) else {
        let sink = Arc::new(ConsoleSink::new(&config.name));
        let metrics = Arc::clone(sink.metrics());
        return Ok(BuiltSink { sink, metrics });
    };

    let endpoint = config
        .endpoint_uri
        .clone()
        .ok_or_else(|| DispatcherError::sink_creation(&config.name, "endpoint_uri is required"))?;
    let transport = ReqwestTransport::new(config.request_timeout())
        .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;

    let sink = Arc::new(DeliverySink::spawn(
        DeliveryConfig {
            name: config.name.clone(),
            endpoint,
            mode,
            batch_size_limit: config.batch_size_limit,
            max_wait_interval: config.max_wait_interval(),
        },
        Arc::new(transport),
    ));
    let metrics = Arc::clone(sink.metrics());
    Ok(BuiltSink { sink, metrics })
}

/// Create every configured sink, in order
pub fn build_sinks(configs: &[SinkConfig]) -> Result<Vec<BuiltSink>, DispatcherError> {
    configs.iter().map(build_sink).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkState;

    #[tokio::test]
    async fn test_build_console_sink() {
        let built = build_sink(&SinkConfig::console("stdout")).unwrap();
        assert_eq!(built.name(), "stdout");
        assert_eq!(built.sink.state(), SinkState::Open);
    }

    #[tokio::test]
    async fn test_build_http_sink() {
        let config = SinkConfig::http("collector", SinkType::Bundling, "http://127.0.0.1:9/logs");
        let built = build_sink(&config).unwrap();

        assert_eq!(built.name(), "collector");
        built.sink.close().await.unwrap();
        assert_eq!(built.sink.state(), SinkState::Closed);
    }

    #[tokio::test]
    async fn test_http_sink_requires_endpoint() {
        let mut config = SinkConfig::console("broken");
        config.sink_type = SinkType::Batching;

        let err = build_sink(&config).err().unwrap();
        assert!(matches!(err, DispatcherError::SinkCreation { .. }));
    }

    #[test]
    fn test_delivery_mode_mapping() {
        assert_eq!(delivery_mode(SinkType::Console), None);
        assert_eq!(delivery_mode(SinkType::Simple), Some(DeliveryMode::Simple));
        assert_eq!(delivery_mode(SinkType::Bundling), Some(DeliveryMode::Bundling));
    }
}
