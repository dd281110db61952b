use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::timezone::local_midnight;

/// A 24 hour query window starting at local midnight.
///
/// Both ends are inclusive: an occurrence exactly at `end` (tomorrow's
/// midnight) still counts as today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub const LENGTH_HOURS: i64 = 24;

    /// Window for the calendar day `date` as observed in `tz`.
    pub fn for_date(date: NaiveDate, tz: &Tz) -> Self {
        let start = local_midnight(date, tz);
        Self {
            start,
            end: start + Duration::hours(Self::LENGTH_HOURS),
        }
    }

    /// Window for the local day that contains `now`.
    pub fn containing(now: DateTime<Utc>, tz: &Tz) -> Self {
        Self::for_date(now.with_timezone(tz).date_naive(), tz)
    }

    /// Window for today, computed from the system clock.
    pub fn today(tz: &Tz) -> Self {
        Self::containing(Utc::now(), tz)
    }

    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// The local calendar date the window was built for.
    pub fn date(&self, tz: &Tz) -> NaiveDate {
        self.start.with_timezone(tz).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn test_window_is_exactly_one_day() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let window = DayWindow::for_date(date, &Berlin);
        assert_eq!(window.end - window.start, Duration::hours(24));
        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 10, 16, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_window_containing_uses_local_date() {
        // 23:30 UTC on the 16th is already the 17th in Berlin
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 23, 30, 0).unwrap();
        let window = DayWindow::containing(now, &Berlin);
        assert_eq!(window.date(&Berlin), NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());

        let utc_window = DayWindow::containing(now, &Tz::UTC);
        assert_eq!(utc_window.date(&Tz::UTC), NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = DayWindow::for_date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(), &Tz::UTC);
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.start - Duration::seconds(1)));
        assert!(!window.contains(window.end + Duration::seconds(1)));
    }
}
