// crates/api-hub-core/src/core/time.rs
// ============================================================================
// Module: API Hub Time Model
// Description: Canonical timestamp representation for API Hub records.
// Purpose: Provide millisecond-precision UTC timestamps with an RFC 3339 wire form.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Record timestamps are UTC instants truncated to whole milliseconds so they
//! survive a round trip through storage (unix milliseconds) and the wire
//! (RFC 3339 text) without drift.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as _;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Nanoseconds per millisecond.
const NANOS_PER_MILLI: i128 = 1_000_000;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// UTC timestamp with millisecond precision.
///
/// # Invariants
/// - Sub-millisecond precision is always zero.
/// - Serialized as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        let millis = now.unix_timestamp_nanos() / NANOS_PER_MILLI;
        Self(OffsetDateTime::from_unix_timestamp_nanos(millis * NANOS_PER_MILLI).unwrap_or(now))
    }

    /// Builds a timestamp from unix epoch milliseconds.
    #[must_use]
    pub fn from_unix_millis(millis: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * NANOS_PER_MILLI)
            .ok()
            .map(Self)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub fn unix_millis(&self) -> i64 {
        i64::try_from(self.0.unix_timestamp_nanos() / NANOS_PER_MILLI).unwrap_or(i64::MAX)
    }

    /// Parses an RFC 3339 timestamp, truncating to milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`time::error::Parse`] when the text is not RFC 3339.
    pub fn parse_rfc3339(text: &str) -> Result<Self, time::error::Parse> {
        let parsed = OffsetDateTime::parse(text, &Rfc3339)?;
        let millis = parsed.unix_timestamp_nanos() / NANOS_PER_MILLI;
        Ok(Self(
            OffsetDateTime::from_unix_timestamp_nanos(millis * NANOS_PER_MILLI).unwrap_or(parsed),
        ))
    }

    /// Returns the RFC 3339 text form.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.format(&Rfc3339).unwrap_or_else(|_| self.unix_millis().to_string())
    }

    /// Returns the calendar date as `YYYY-MM-DD`.
    #[must_use]
    pub fn date_string(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.0.year(), u8::from(self.0.month()), self.0.day())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse_rfc3339(&text).map_err(D::Error::custom)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use super::Timestamp;

    #[test]
    fn unix_millis_round_trip_is_exact() {
        let stamp = Timestamp::from_unix_millis(1_767_225_600_123).unwrap();
        assert_eq!(stamp.unix_millis(), 1_767_225_600_123);
        assert_eq!(stamp.date_string(), "2026-01-01");
    }

    #[test]
    fn now_has_no_sub_millisecond_part() {
        let stamp = Timestamp::now();
        let again = Timestamp::from_unix_millis(stamp.unix_millis()).unwrap();
        assert_eq!(stamp, again);
    }

    #[test]
    fn serializes_as_rfc3339_text() {
        let stamp = Timestamp::from_unix_millis(0).unwrap();
        let json = serde_json::to_string(&stamp).unwrap();
        assert_eq!(json, "\"1970-01-01T00:00:00Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stamp);
    }

    #[test]
    fn rejects_non_rfc3339_text() {
        assert!(serde_json::from_str::<Timestamp>("\"yesterday\"").is_err());
    }
}
