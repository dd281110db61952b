use anyhow::Result;
use chrono::{NaiveDate, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;

/// Parse the day a dashboard is rendered for: ISO dates or phrases like "tomorrow".
pub fn parse_day(date_str: &str, timezone: &Tz) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d") {
        return Ok(date);
    }

    let now = Utc::now().with_timezone(timezone);
    parse_date_string(date_str, now, Dialect::Uk)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", date_str, e))
}

/// The requested day, or today in `timezone`.
pub fn day_or_today(date_str: Option<&str>, timezone: &Tz) -> Result<NaiveDate> {
    match date_str {
        Some(s) => parse_day(s, timezone),
        None => Ok(Utc::now().with_timezone(timezone).date_naive()),
    }
}
