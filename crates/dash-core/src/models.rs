use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::window::DayWindow;

/// One row of the events/recurrence join, in store-native units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CalendarEvent {
    pub title: String,
    /// Microseconds since the Unix epoch.
    pub start_micros: i64,
    /// Microseconds since the Unix epoch.
    pub end_micros: i64,
    /// RRULE/EXRULE/RDATE/EXDATE lines, without a DTSTART anchor.
    pub recurrence_rule: String,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, start_micros: i64, end_micros: i64, rule: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            start_micros,
            end_micros,
            recurrence_rule: rule.into(),
        }
    }
}

/// The occurrences of one event that fall inside a day window.
#[derive(Debug, Clone)]
pub struct ResolvedOccurrenceSet<'a> {
    pub event: &'a CalendarEvent,
    /// Chronologically non-decreasing; may be empty.
    pub occurrences: Vec<DateTime<Utc>>,
    pub window: DayWindow,
}

impl<'a> ResolvedOccurrenceSet<'a> {
    #[inline]
    pub fn occurs(&self) -> bool {
        !self.occurrences.is_empty()
    }

    #[inline]
    pub fn first_occurrence(&self) -> Option<DateTime<Utc>> {
        self.occurrences.first().copied()
    }
}
