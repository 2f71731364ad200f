//! Start-time parsing and validation.

use chrono::{DateTime, NaiveDateTime, Utc};
use fairway_core::clock::Clock;
use thiserror::Error;

/// Rejection reasons for a requested start time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The input matched none of the accepted formats.
    #[error("unrecognized start time {0:?}; use RFC 3339 or YYYY-MM-DD HH:MM")]
    Unparseable(String),

    /// The parsed time is not in the future.
    #[error("start time {0} is in the past")]
    InPast(DateTime<Utc>),
}

/// Parses a user-entered start time and checks it lies after `clock.now()`.
///
/// Accepts RFC 3339 or `YYYY-MM-DD HH:MM` (assumed UTC).
///
/// # Errors
///
/// Returns [`ScheduleError`] for unparseable input or a non-future time.
pub fn parse_start_time(input: &str, clock: &dyn Clock) -> Result<DateTime<Utc>, ScheduleError> {
    let trimmed = input.trim();
    let parsed = DateTime::parse_from_rfc3339(trimmed)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M")
                .map(|t| t.and_utc())
                .map_err(|_| ScheduleError::Unparseable(trimmed.to_owned()))
        })?;
    if parsed <= clock.now() {
        return Err(ScheduleError::InPast(parsed));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fairway_core::clock::Clock;

    use super::{parse_start_time, ScheduleError};

    struct TestClock(chrono::DateTime<Utc>);

    impl Clock for TestClock {
        fn now(&self) -> chrono::DateTime<Utc> {
            self.0
        }
    }

    fn clock() -> TestClock {
        TestClock(Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_accepts_rfc3339() {
        let parsed = parse_start_time("2026-06-02T09:30:00Z", &clock()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 6, 2, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_accepts_simple_format_as_utc() {
        let parsed = parse_start_time("2026-06-02 09:30", &clock()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 6, 2, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        let err = parse_start_time("next saturday-ish", &clock()).unwrap_err();
        assert!(matches!(err, ScheduleError::Unparseable(_)));
    }

    #[test]
    fn test_rejects_past_times() {
        let err = parse_start_time("2026-05-31 09:30", &clock()).unwrap_err();
        assert!(matches!(err, ScheduleError::InPast(_)));
    }
}
