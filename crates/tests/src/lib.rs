//! # Integration Tests
//!
//! End-to-end tests across the workspace crates.
//!
//! Covers:
//! - Logger → SinkRegistry → DeliverySink with an in-memory transport
//! - Delivery to a real HTTP collector (wiremock)
//! - Configuration → sink factory → delivery

#[cfg(test)]
mod support {
    use std::sync::Arc;
    use std::time::Duration;

    use dispatcher::{DeliveryConfig, DeliveryMode, DeliverySink, RecordingTransport};
    use formatter::JsonFormatter;
    use logger::{Logger, SinkRegistry};

    pub fn delivery_sink(
        name: &str,
        mode: DeliveryMode,
        limit: usize,
        transport: Arc<RecordingTransport>,
    ) -> Arc<DeliverySink> {
        Arc::new(DeliverySink::spawn(
            DeliveryConfig {
                name: name.to_string(),
                endpoint: format!("http://collector.test/{name}"),
                mode,
                batch_size_limit: limit,
                max_wait_interval: Duration::from_secs(60),
            },
            transport,
        ))
    }

    pub fn logger(context: &str, registry: &Arc<SinkRegistry>) -> Logger {
        Logger::new(context, Arc::clone(registry), Arc::new(JsonFormatter::default()))
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use contracts::{EventSink, SinkState};
    use dispatcher::{DeliveryMode, MockTransportConfig, RecordingTransport};
    use logger::{Entry, SinkRegistry};
    use serde_json::json;

    use crate::support::{delivery_sink, logger};

    /// Logger → Registry → bundling DeliverySink → transport
    #[tokio::test]
    async fn test_e2e_bundled_delivery() {
        let transport = Arc::new(RecordingTransport::new());
        let sink = delivery_sink("bundle", DeliveryMode::Bundling, 3, Arc::clone(&transport));
        let registry = Arc::new(SinkRegistry::with_sinks([sink.clone() as Arc<dyn EventSink>]));
        let calc = logger("Calc", &registry);

        for div in 0..7 {
            calc.warning(Entry::typed("MathOperation", json!({"Div": div, "Result": "NaN"})));
        }
        calc.flush().await.unwrap();

        let events = transport.delivered_events();
        assert_eq!(events.len(), 7);
        assert!(events
            .iter()
            .all(|e| e["payload_type"] == "Calc.MathOperation" && e["level"] == "Warning"));
        // Threshold cuts keep at most `limit` events per bundle
        assert!(transport
            .requests()
            .iter()
            .all(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap()
                .as_array()
                .is_some_and(|a| a.len() <= 3)));

        let metrics = sink.metrics().snapshot();
        assert_eq!(metrics.emitted_count, 7);
        assert_eq!(metrics.delivered_count, 7);
        assert_eq!(metrics.in_flight(), 0);

        registry.close_all().await.unwrap();
        assert_eq!(sink.state(), SinkState::Closed);
    }

    /// A failing sink does not affect a healthy sink on the same registry
    #[tokio::test]
    async fn test_e2e_failing_sink_isolated() {
        let healthy = Arc::new(RecordingTransport::new());
        let broken = Arc::new(RecordingTransport::with_config(MockTransportConfig {
            fail_all: true,
            ..Default::default()
        }));

        let good_sink = delivery_sink("good", DeliveryMode::Batching, 4, Arc::clone(&healthy));
        let bad_sink = delivery_sink("bad", DeliveryMode::Batching, 4, Arc::clone(&broken));
        let registry = Arc::new(SinkRegistry::with_sinks([
            good_sink.clone() as Arc<dyn EventSink>,
            bad_sink.clone() as Arc<dyn EventSink>,
        ]));
        let app = logger("App", &registry);

        for i in 0..10 {
            app.info(Entry::from(format!("event {i}")));
        }
        app.flush().await.unwrap();

        assert_eq!(healthy.request_count(), 10);
        assert_eq!(broken.attempt_count(), 10);
        assert_eq!(bad_sink.metrics().failed_count(), 10);
        assert_eq!(good_sink.metrics().failed_count(), 0);

        registry.close_all().await.unwrap();
    }

    /// Captured errors arrive with a fingerprint
    #[tokio::test]
    async fn test_e2e_exception_info_delivered() {
        let transport = Arc::new(RecordingTransport::new());
        let sink = delivery_sink("errors", DeliveryMode::Simple, 1, Arc::clone(&transport));
        let registry = Arc::new(SinkRegistry::with_sinks([sink as Arc<dyn EventSink>]));
        let calc = logger("Calc", &registry);

        let error = "abc".parse::<i32>().unwrap_err();
        calc.fatal(
            Entry::new()
                .with_payload_type("CalculationError")
                .with_message("Outch")
                .with_payload(json!({"Input": "abc"}))
                .with_error(&error),
        );
        registry.close_all().await.unwrap();

        let events = transport.delivered_events();
        assert_eq!(events.len(), 1);
        let info = &events[0]["exception_info"];
        assert_eq!(info["exception_type"], "ParseIntError");
        assert!(!info["exception_hash"].as_str().unwrap().is_empty());
        assert_eq!(events[0]["calc_calculation_error"]["Input"], "abc");
    }

    /// Events emitted after close are rejected; close delivers what was queued
    #[tokio::test]
    async fn test_e2e_close_drains_then_rejects() {
        let transport = Arc::new(RecordingTransport::new());
        let sink = delivery_sink("drain", DeliveryMode::Bundling, 50, Arc::clone(&transport));
        let registry = Arc::new(SinkRegistry::with_sinks([sink.clone() as Arc<dyn EventSink>]));
        let app = logger("App", &registry);

        for i in 0..5 {
            app.debug(Entry::from(format!("queued {i}")));
        }
        registry.close_all().await.unwrap();
        assert_eq!(transport.delivered_events().len(), 5);

        app.info("too late");
        assert_eq!(sink.metrics().rejected_count(), 1);
        assert_eq!(transport.delivered_events().len(), 5);
    }

    /// Foreign `tracing` events reach the sinks through the bridge
    #[tokio::test]
    async fn test_e2e_tracing_bridge() {
        use tracing_subscriber::layer::SubscriberExt;

        let transport = Arc::new(RecordingTransport::new());
        let sink = delivery_sink("bridge", DeliveryMode::Bundling, 10, Arc::clone(&transport));
        let registry = Arc::new(SinkRegistry::with_sinks([sink as Arc<dyn EventSink>]));
        let bridge = logger::TracingBridge::new(
            Arc::clone(&registry),
            Arc::new(formatter::JsonFormatter::default()),
        );

        {
            let subscriber = tracing_subscriber::registry().with(bridge);
            let _guard = tracing::subscriber::set_default(subscriber);
            tracing::warn!(target: "billing", invoice = 42, "Invoice overdue");
        }
        registry.flush_all().await.unwrap();

        let events = transport.delivered_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["context"], "billing");
        assert_eq!(events[0]["message"], "Invoice overdue");
        assert_eq!(events[0]["payload_type"], logger::EXTERNAL_PAYLOAD_TYPE);

        registry.close_all().await.unwrap();
    }
}

#[cfg(test)]
mod http_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{SinkConfig, SinkType};
    use formatter::{FormatterOptions, JsonFormatter};
    use logger::{Entry, Logger, SinkRegistry};
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn collector() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logs"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        server
    }

    async fn bodies(server: &MockServer) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }

    fn registry_for(configs: &[SinkConfig]) -> Arc<SinkRegistry> {
        let sinks = dispatcher::build_sinks(configs).unwrap();
        Arc::new(SinkRegistry::with_sinks(
            sinks.into_iter().map(|built| built.sink),
        ))
    }

    /// Batching sink: one POST per event
    #[tokio::test]
    async fn test_batching_sink_posts_each_event() {
        let server = collector().await;
        let mut config = SinkConfig::http(
            "collector",
            SinkType::Batching,
            format!("{}/logs", server.uri()),
        );
        config.batch_size_limit = 5;
        let registry = registry_for(&[config]);
        let calc = Logger::new("Calc", Arc::clone(&registry), Arc::new(JsonFormatter::default()));

        for div in 0..12 {
            calc.warning(Entry::typed("MathOperation", json!({"Div": div})));
        }
        calc.flush().await.unwrap();

        let bodies = bodies(&server).await;
        assert_eq!(bodies.len(), 12);
        assert!(bodies.iter().all(Value::is_object));
        let mut divs: Vec<i64> = bodies
            .iter()
            .map(|b| b["calc_math_operation"]["Div"].as_i64().unwrap())
            .collect();
        divs.sort_unstable();
        assert_eq!(divs, (0..12).collect::<Vec<_>>());

        registry.close_all().await.unwrap();
    }

    /// Bundling sink: one POST per batch with a JSON array body
    #[tokio::test]
    async fn test_bundling_sink_posts_arrays() {
        let server = collector().await;
        let mut config = SinkConfig::http(
            "bundle",
            SinkType::Bundling,
            format!("{}/logs", server.uri()),
        );
        config.batch_size_limit = 4;
        let registry = registry_for(&[config]);
        let app = Logger::new("App", Arc::clone(&registry), Arc::new(JsonFormatter::default()));

        for i in 0..10 {
            app.info(Entry::from(format!("event {i}")));
        }
        registry.close_all().await.unwrap();

        let bodies = bodies(&server).await;
        assert!(bodies.iter().all(Value::is_array));
        let total: usize = bodies.iter().map(|b| b.as_array().map_or(0, Vec::len)).sum();
        assert_eq!(total, 10);
        assert!(bodies.iter().all(|b| b.as_array().is_some_and(|a| a.len() <= 4)));
    }

    /// Non-2xx responses are counted as failures and not retried
    #[tokio::test]
    async fn test_collector_errors_counted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let built = dispatcher::build_sink(&SinkConfig::http(
            "flaky",
            SinkType::Simple,
            format!("{}/logs", server.uri()),
        ))
        .unwrap();
        let registry = Arc::new(SinkRegistry::with_sinks([Arc::clone(&built.sink)]));
        let app = Logger::new("App", Arc::clone(&registry), Arc::new(JsonFormatter::default()));

        app.error("first");
        app.error("second");
        app.flush().await.unwrap();

        assert_eq!(built.metrics.failed_count(), 2);
        assert_eq!(built.metrics.delivered_count(), 0);
        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 2);

        registry.close_all().await.unwrap();
    }

    /// Configuration text → factory → HTTP delivery with stamped fields
    #[tokio::test]
    async fn test_config_to_delivery() {
        let server = collector().await;
        let toml = format!(
            r#"
app_name = "calculator"
environment = "staging"
min_level = "info"

[[sinks]]
name = "collector"
sink_type = "bundling"
endpoint_uri = "{}/logs"
batch_size_limit = 10
max_wait_interval_secs = 0.2
"#,
            server.uri()
        );
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let registry = registry_for(&blueprint.sinks);
        let formatter = Arc::new(JsonFormatter::new(FormatterOptions {
            app_name: blueprint.app_name.clone(),
            environment: blueprint.environment.clone(),
        }));
        let calc = Logger::new("Calc", Arc::clone(&registry), formatter).with_level(blueprint.min_level);

        calc.debug("filtered out");
        calc.warning(Entry::typed("MathOperation", json!({"Div": 0, "Result": "NaN"})));

        // Below the size limit: the elapsed trigger sends the batch
        tokio::time::sleep(Duration::from_millis(800)).await;

        let bodies = bodies(&server).await;
        assert_eq!(bodies.len(), 1);
        let event = &bodies[0][0];
        assert_eq!(event["app_name"], "calculator");
        assert_eq!(event["env"], "staging");
        assert_eq!(event["payload_type"], "Calc.MathOperation");
        assert_eq!(event["calc_math_operation"]["Result"], "NaN");

        registry.close_all().await.unwrap();
        assert!(registry.sinks().iter().all(|s| s.state() == contracts::SinkState::Closed));
    }
}
