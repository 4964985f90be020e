//! # Logger
//!
//! Application-facing logging API.
//!
//! Responsibilities:
//! - Hold the explicit registry of sinks set up at process start
//! - Build records from per-level calls, filter by level, format them
//! - Fan formatted events out to every registered sink
//! - Forward foreign `tracing` events into the same sinks

pub mod bridge;
pub mod entry;
pub mod error;
pub mod logger;
pub mod registry;

pub use bridge::{TracingBridge, EXTERNAL_PAYLOAD_TYPE};
pub use contracts::{CapturedError, LogLevel, Payload};
pub use entry::Entry;
pub use error::LoggerError;
pub use logger::Logger;
pub use registry::SinkRegistry;
