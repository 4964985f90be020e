//! EventRecord - the canonical structured event
//!
//! Built synchronously by a log call, consumed immediately by the formatter,
//! then discarded.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::{CapturedError, ContractError, LogLevel, Payload};

/// Timestamp as supplied by a caller.
///
/// Both aware and naive values are representable so the offset invariant can
/// be enforced at record construction instead of being hidden by the type
/// system at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampInput {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl TimestampInput {
    /// Parse an RFC 3339 string; strings without an offset parse as naive.
    pub fn parse(value: &str) -> Result<Self, ContractError> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self::Aware(ts));
        }
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .map(Self::Naive)
            .map_err(|e| ContractError::InvalidTimestamp {
                value: value.to_string(),
                message: e.to_string(),
            })
    }

    /// # Errors
    /// Returns `ContractError::NaiveTimestamp` for naive input.
    pub fn into_aware(self) -> Result<DateTime<FixedOffset>, ContractError> {
        match self {
            Self::Aware(ts) => Ok(ts),
            Self::Naive(ts) => Err(ContractError::NaiveTimestamp {
                value: ts.to_string(),
            }),
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimestampInput {
    fn from(ts: DateTime<Tz>) -> Self {
        Self::Aware(ts.fixed_offset())
    }
}

impl From<NaiveDateTime> for TimestampInput {
    fn from(ts: NaiveDateTime) -> Self {
        Self::Naive(ts)
    }
}

/// Canonical structured event.
///
/// Fields are private; a record is assembled with the `with_*` builders and
/// is read-only once handed to the formatter.
#[derive(Debug, Clone)]
pub struct EventRecord {
    timestamp: DateTime<FixedOffset>,
    level: LogLevel,
    context: String,
    payload_type: String,
    message: String,
    payload: Option<Payload>,
    exception: Option<CapturedError>,
}

impl EventRecord {
    /// Create a record stamped with the current UTC time
    pub fn new(level: LogLevel, context: impl Into<String>, payload_type: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().fixed_offset(),
            level,
            context: context.into(),
            payload_type: payload_type.into(),
            message: String::new(),
            payload: None,
            exception: None,
        }
    }

    /// Create a record with an explicit timestamp.
    ///
    /// # Errors
    /// Returns `ContractError::NaiveTimestamp` when the timestamp has no offset.
    pub fn at(
        level: LogLevel,
        context: impl Into<String>,
        payload_type: impl Into<String>,
        timestamp: impl Into<TimestampInput>,
    ) -> Result<Self, ContractError> {
        let timestamp = timestamp.into().into_aware()?;
        Ok(Self {
            timestamp,
            ..Self::new(level, context, payload_type)
        })
    }

    /// Replace the timestamp; the type already guarantees an offset
    pub fn with_timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = timestamp;
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

    pub fn with_exception(mut self, exception: CapturedError) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn timestamp(&self) -> &DateTime<FixedOffset> {
        &self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn payload_type(&self) -> &str {
        &self.payload_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn exception(&self) -> Option<&CapturedError> {
        self.exception.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_naive_timestamp_rejected() {
        let naive = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let result = EventRecord::at(LogLevel::Info, "ctx", "type", naive);
        assert!(matches!(result, Err(ContractError::NaiveTimestamp { .. })));
    }

    #[test]
    fn test_aware_timestamp_kept() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let ts = offset.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let record = EventRecord::at(LogLevel::Info, "ctx", "type", ts).unwrap();
        assert_eq!(record.timestamp(), &ts);
        assert_eq!(record.timestamp().offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_utc_timestamp_accepted() {
        let record = EventRecord::at(LogLevel::Debug, "ctx", "", Utc::now());
        assert!(record.is_ok());
    }

    #[test]
    fn test_parse_timestamp_string() {
        assert!(matches!(
            TimestampInput::parse("2024-05-01T12:00:00+02:00").unwrap(),
            TimestampInput::Aware(_)
        ));
        assert!(matches!(
            TimestampInput::parse("2024-05-01T12:00:00").unwrap(),
            TimestampInput::Naive(_)
        ));
        assert!(TimestampInput::parse("yesterday").is_err());
    }

    #[test]
    fn test_builder_fields() {
        let record = EventRecord::new(LogLevel::Warning, "Calc", "MathOperation")
            .with_message("division")
            .with_payload("text");

        assert_eq!(record.level(), LogLevel::Warning);
        assert_eq!(record.context(), "Calc");
        assert_eq!(record.payload_type(), "MathOperation");
        assert_eq!(record.message(), "division");
        assert!(matches!(record.payload(), Some(Payload::Text(_))));
        assert!(record.exception().is_none());
    }
}
