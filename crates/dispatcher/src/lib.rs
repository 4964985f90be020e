//! # Dispatcher
//!
//! Asynchronous delivery pipeline.
//!
//! Responsibilities:
//! - Queue serialized events without blocking the emitting caller
//! - Cut batches by size, age, or on explicit flush/close
//! - Deliver batches over HTTP through a bounded worker pool
//! - Isolate per-event delivery failures from siblings and from the caller
//!
//! Events are delivered at most once: failed deliveries are logged and
//! counted, never retried. Arrival order at the collector is not guaranteed
//! across batches; order by the event `timestamp` instead.

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod mock_transport;
pub mod policy;
pub mod queue;
pub mod sinks;
pub mod transmitter;
pub mod transport;

pub use contracts::{EventSink, SerializedEvent, SinkState, Transport};
pub use dispatcher::{Dispatcher, DEADLINE_SLACK};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use mock_transport::{MockTransportConfig, RecordedRequest, RecordingTransport};
pub use policy::{BatchPolicy, Trigger};
pub use queue::DeliveryQueue;
pub use sinks::{build_sink, build_sinks, delivery_mode, BuiltSink, ConsoleSink, DeliveryConfig, DeliverySink};
pub use transmitter::{BatchReport, DeliveryMode, Transmitter, MAX_TRANSMIT_WORKERS};
pub use transport::ReqwestTransport;
