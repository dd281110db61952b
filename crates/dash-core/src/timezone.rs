use crate::error::CoreError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Parse an IANA timezone name
pub fn parse_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone).map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<(), CoreError> {
    parse_timezone(timezone).map(|_| ())
}

/// Resolve a local wall-clock time on `date` to a UTC instant.
///
/// Ambiguous times (DST fall back) resolve to the earliest instant. Times that
/// don't exist (spring forward) move to the first valid time after the gap,
/// searched in 15 minute steps.
pub fn resolve_local(date: NaiveDate, time: NaiveTime, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    if let Some(local_dt) = tz.from_local_datetime(&naive).earliest() {
        return local_dt.with_timezone(&Utc);
    }

    let mut probe = naive;
    for _ in 0..16 {
        probe += Duration::minutes(15);
        if let Some(local_dt) = tz.from_local_datetime(&probe).earliest() {
            return local_dt.with_timezone(&Utc);
        }
    }

    // No zone has a gap longer than four hours; treat the wall time as UTC
    naive.and_utc()
}

/// Midnight at the start of `date` in `tz`
pub fn local_midnight(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    resolve_local(date, NaiveTime::MIN, tz)
}

/// Format datetime with timezone-aware display
pub fn format_with_timezone(datetime: DateTime<Utc>, tz: &Tz, format: &str) -> String {
    datetime.with_timezone(tz).format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("America/New_York").is_ok());
        assert!(validate_timezone("Invalid/Timezone").is_err());
    }

    #[test]
    fn test_parse_timezone_error_carries_name() {
        let err = parse_timezone("Mars/Olympus_Mons").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTimezone(name) if name == "Mars/Olympus_Mons"));
    }

    #[test]
    fn test_local_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let midnight = local_midnight(date, &Tz::UTC);
        assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_local_midnight_with_offset() {
        // CEST is UTC+2
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let midnight = local_midnight(date, &chrono_tz::Europe::Berlin);
        assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 10, 16, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_midnight_inside_dst_gap_moves_forward() {
        // Havana springs forward at midnight: 2026-03-08 00:00 does not exist
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let midnight = local_midnight(date, &chrono_tz::America::Havana);
        let local = midnight.with_timezone(&chrono_tz::America::Havana);
        assert_eq!(local.date_naive(), date);
        assert_eq!(local.time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
    }

    #[test]
    fn test_format_with_timezone() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 17, 7, 30, 0).unwrap();
        let text = format_with_timezone(instant, &chrono_tz::Europe::Berlin, "%H:%M");
        assert_eq!(text, "09:30");
    }
}
