//! Time utilities for transaction timestamps and balance cutoffs.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};

/// A timestamp with timezone (always UTC for ledger records).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Timestamp for a transaction appended after `latest`.
///
/// The wall clock can step backwards; the log cannot. The result is never
/// earlier than `latest`, so ties are possible but inversions are not.
/// Precision is microseconds, the finest a PostgreSQL `TIMESTAMPTZ` keeps.
pub fn next_timestamp(latest: Option<Timestamp>) -> Timestamp {
    let current = now().trunc_subsecs(6);
    match latest {
        Some(latest) if latest > current => latest,
        _ => current,
    }
}

/// Parse a balance cutoff.
///
/// Accepts an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS` (taken as
/// UTC), or a bare `YYYY-MM-DD` date meaning the start of that day in UTC.
pub fn parse_cutoff(s: &str) -> Option<Timestamp> {
    let s = s.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Start of the given calendar day in UTC.
pub fn start_of_day(year: i32, month: u32, day: u32) -> Option<Timestamp> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_next_timestamp_never_goes_backwards() {
        let future = now() + Duration::seconds(30);
        assert_eq!(next_timestamp(Some(future)), future);

        let past = now() - Duration::seconds(30);
        assert!(next_timestamp(Some(past)) > past);

        let before = now().trunc_subsecs(6);
        assert!(next_timestamp(None) >= before);
        assert_eq!(next_timestamp(None).timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_parse_cutoff() {
        let expected = start_of_day(2020, 1, 20).unwrap();

        assert_eq!(parse_cutoff("2020-01-20"), Some(expected));
        assert_eq!(parse_cutoff("2020-01-20T00:00:00Z"), Some(expected));
        assert_eq!(parse_cutoff("2020-01-20T00:00:00"), Some(expected));
        assert_eq!(parse_cutoff("2020-01-20T02:00:00+02:00"), Some(expected));

        assert_eq!(parse_cutoff("yesterday"), None);
        assert_eq!(parse_cutoff("2020-13-01"), None);
    }
}
