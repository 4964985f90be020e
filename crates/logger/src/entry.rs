//! Entry - the arguments of one log call

use contracts::{
    CapturedError, ContractError, EventRecord, LogLevel, Payload, TimestampInput,
};
use serde::Serialize;

/// Everything a log call carries besides its level and logger context.
///
/// ```ignore
/// logger.warning(
///     Entry::typed("MathOperation", json!({"Div": 0, "Result": "NaN"}))
///         .with_message("division by zero"),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Entry {
    payload_type: String,
    message: String,
    payload: Option<Payload>,
    exception: Option<CapturedError>,
    timestamp: Option<TimestampInput>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry with a payload and its type
    pub fn typed(payload_type: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self::new()
            .with_payload_type(payload_type)
            .with_payload(payload)
    }

    pub fn with_payload_type(mut self, payload_type: impl Into<String>) -> Self {
        self.payload_type = payload_type.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Attach any serializable value; conversion failures surface later as
    /// the formatter's fallback event, never here
    pub fn with_serialized<T: Serialize + ?Sized>(mut self, payload: &T) -> Self {
        self.payload = Some(Payload::from_serialize(payload));
        self
    }

    pub fn with_exception(mut self, exception: CapturedError) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Capture an error, its source chain and the current backtrace
    pub fn with_error<E: std::error::Error + 'static>(self, error: &E) -> Self {
        self.with_exception(CapturedError::from_error(error))
    }

    /// Use an explicit timestamp instead of the time of the call.
    ///
    /// # Errors
    /// Returns `ContractError::NaiveTimestamp` when the timestamp carries no
    /// offset.
    pub fn at(mut self, timestamp: impl Into<TimestampInput>) -> Result<Self, ContractError> {
        let timestamp = timestamp.into();
        timestamp.into_aware()?;
        self.timestamp = Some(timestamp);
        Ok(self)
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Build the record; `payload_type` is the final, possibly prefixed, type
    pub(crate) fn into_record(
        self,
        level: LogLevel,
        context: &str,
        payload_type: String,
    ) -> EventRecord {
        let mut record = EventRecord::new(level, context, payload_type).with_message(self.message);

        if let Some(Ok(timestamp)) = self.timestamp.map(TimestampInput::into_aware) {
            record = record.with_timestamp(timestamp);
        }
        if let Some(payload) = self.payload {
            record = record.with_payload(payload);
        }
        if let Some(exception) = self.exception {
            record = record.with_exception(exception);
        }
        record
    }
}

impl From<&str> for Entry {
    fn from(message: &str) -> Self {
        Self::new().with_message(message)
    }
}

impl From<String> for Entry {
    fn from(message: String) -> Self {
        Self::new().with_message(message)
    }
}
