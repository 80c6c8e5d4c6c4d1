// src/utils/time.rs - Time utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Time utilities used for review ids, timestamps, and status reporting
pub struct Time;

impl Time {
    /// Get current UTC time
    pub fn now() -> DateTime<Utc> {
        Utc::now()
    }

    /// Get current timestamp as milliseconds since epoch
    pub fn now_millis() -> u64 {
        Utc::now().timestamp_millis() as u64
    }

    /// Create a DateTime from milliseconds since epoch
    pub fn from_millis(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis)
            .unwrap_or_else(|| DateTime::from_timestamp(1640995200, 0).unwrap_or_default())
    }

    /// Format a DateTime as an ISO-8601 string with millisecond precision
    /// ("2024-05-01T12:34:56.789Z")
    pub fn to_iso8601(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_round_trip() {
        let millis = Time::now_millis();
        let dt = Time::from_millis(millis as i64);
        assert_eq!(dt.timestamp_millis() as u64, millis);
    }

    #[test]
    fn test_iso8601_format() {
        let dt = Time::from_millis(1_714_567_890_123);
        let formatted = Time::to_iso8601(&dt);
        assert!(formatted.ends_with('Z'));
        assert!(formatted.contains('T'));
        // millisecond precision, no micros
        assert_eq!(formatted.matches('.').count(), 1);
    }
}
