//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the logging pipeline.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Event Model
//! - An `EventRecord` is built synchronously by a log call and is immutable afterwards
//! - The formatter turns it into a `SerializedEvent`, the unit that flows through sinks
//! - Timestamps always carry an explicit offset; naive timestamps are rejected

mod blueprint;
mod error;
mod event;
mod exception;
mod level;
mod payload;
mod serialized;
mod sink;
mod transport;

pub use blueprint::*;
pub use error::*;
pub use event::{EventRecord, TimestampInput};
pub use exception::{CapturedError, StackFrame};
pub use level::LogLevel;
pub use payload::Payload;
pub use serialized::SerializedEvent;
pub use sink::{EventSink, SinkState};
pub use transport::{LocalTransport, Transport};
