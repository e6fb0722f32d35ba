//! Daily sync windows
//!
//! Incremental sync is chunked by calendar day: each window parameterizes one
//! request against the upstream API. Windows are computed fresh for every sync
//! from the effective start date and a single "now" captured by the engine.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single day's sync window
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SyncWindow {
    /// The calendar day this window covers
    pub date: NaiveDate,
}

impl SyncWindow {
    /// Create a window for the given date
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl std::fmt::Display for SyncWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.date.format(crate::config::DATE_FORMAT))
    }
}

/// Produce one window per day from `start_date` (inclusive) up to, but not
/// including, the calendar date of `reference_now`.
///
/// The comparison is day-precision: a window for "today" is never emitted, so
/// every returned window covers a fully elapsed day. Returns an empty vec when
/// `start_date` is today or later. Pure function of its inputs, so a restarted
/// sync with the same state recomputes the same windows.
pub fn day_windows(start_date: NaiveDate, reference_now: DateTime<Utc>) -> Vec<SyncWindow> {
    let today = reference_now.date_naive();
    let mut windows = Vec::new();
    let mut current = start_date;

    while current < today {
        windows.push(SyncWindow::new(current));
        // NaiveDate + 1 day cannot overflow before year 262143
        current = current
            .checked_add_days(Days::new(1))
            .expect("date overflow");
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test_case(date(2023, 1, 1), now(2023, 1, 4, 12), 3; "three full days")]
    #[test_case(date(2023, 1, 1), now(2023, 1, 2, 0), 1; "single day")]
    #[test_case(date(2023, 1, 1), now(2023, 1, 1, 23), 0; "start is today")]
    #[test_case(date(2023, 2, 1), now(2023, 1, 1, 0), 0; "start after now")]
    #[test_case(date(2023, 2, 26), now(2023, 3, 2, 6), 4; "crosses month boundary")]
    fn test_window_count(start: NaiveDate, reference: DateTime<Utc>, expected: usize) {
        assert_eq!(day_windows(start, reference).len(), expected);
    }

    #[test]
    fn test_windows_are_ascending_one_day_apart() {
        let windows = day_windows(date(2023, 1, 1), now(2023, 1, 10, 0));
        assert_eq!(windows.len(), 9);

        for pair in windows.windows(2) {
            assert_eq!(
                pair[1].date.signed_duration_since(pair[0].date).num_days(),
                1
            );
        }
    }

    #[test]
    fn test_no_window_reaches_reference_now() {
        let reference = now(2023, 6, 15, 3);
        for window in day_windows(date(2023, 6, 1), reference) {
            assert!(window.date < reference.date_naive());
        }
    }

    #[test]
    fn test_restartable_pure_function() {
        let start = date(2023, 1, 1);
        let reference = now(2023, 1, 5, 8);
        assert_eq!(day_windows(start, reference), day_windows(start, reference));
    }

    #[test]
    fn test_leap_day_included() {
        let windows = day_windows(date(2024, 2, 28), now(2024, 3, 1, 0));
        let dates: Vec<NaiveDate> = windows.iter().map(|w| w.date).collect();
        assert_eq!(dates, vec![date(2024, 2, 28), date(2024, 2, 29)]);
    }

    #[test]
    fn test_display_format() {
        let window = SyncWindow::new(date(2023, 1, 7));
        assert_eq!(window.to_string(), "2023-01-07");
    }
}
