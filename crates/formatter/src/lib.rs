//! # Formatter
//!
//! Pure, synchronous transform from `EventRecord` to `SerializedEvent`.
//!
//! Responsibilities:
//! - Build the canonical JSON object (timestamp, level, context, payload, exception)
//! - Derive the payload field name from the payload type
//! - Fingerprint exceptions so repeated failures of one call site group together
//! - Never fail: unserializable input becomes a fallback error event

mod exception;
mod formatter;
mod naming;

pub use exception::{hash_exception, render_trace, ExceptionInfo};
pub use formatter::{FormatterOptions, JsonFormatter, MISSING_PAYLOAD_TYPE_PREFIX};
pub use naming::{field_name, underscore};
