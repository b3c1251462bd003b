//! Identifier and timestamp utilities for Fiszki
//!
//! Items are keyed by SQLite row ids. Timestamps are persisted as Unix
//! milliseconds so that ordering in SQL matches ordering in Rust.

use chrono::{DateTime, Utc};

/// Opaque identity of a reviewable item (card or minimal-pair word)
pub type ItemId = i64;

/// Convert a timestamp to Unix milliseconds for storage
pub fn to_ms(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Convert stored Unix milliseconds back into a timestamp
///
/// Out-of-range values collapse to the Unix epoch.
pub fn from_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ms_conversion_preserves_millis() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap() + chrono::Duration::milliseconds(589);
        assert_eq!(from_ms(to_ms(ts)), ts);
    }

    #[test]
    fn test_epoch() {
        assert_eq!(to_ms(DateTime::UNIX_EPOCH), 0);
        assert_eq!(from_ms(0), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_out_of_range_collapses_to_epoch() {
        assert_eq!(from_ms(i64::MAX), DateTime::UNIX_EPOCH);
    }
}
