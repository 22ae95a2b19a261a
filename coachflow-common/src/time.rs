//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

/// Length of a demo-registration billing period
pub const DEMO_PERIOD_DAYS: i64 = 30;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current Unix time in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// End of a billing period starting at `start`
pub fn period_end(start: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    start + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01
    }

    #[test]
    fn test_now_millis_matches_now() {
        let millis = now_millis();
        let secs = now().timestamp();
        assert!((millis / 1000 - secs).abs() <= 1);
    }

    #[test]
    fn test_period_end_adds_days() {
        let start = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let end = period_end(start, DEMO_PERIOD_DAYS);
        assert_eq!(end.to_rfc3339(), "2026-01-31T00:00:00+00:00");
    }
}
