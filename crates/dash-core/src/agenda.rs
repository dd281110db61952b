use chrono::{Datelike, Months, NaiveDate};

use crate::models::ResolvedOccurrenceSet;

/// Titles of the events that occur in the window, in row order.
///
/// Events without occurrences are dropped. Nothing is re-sorted by time.
pub fn todays_titles(resolved: &[ResolvedOccurrenceSet<'_>]) -> Vec<String> {
    resolved
        .iter()
        .filter(|set| set.occurs())
        .map(|set| set.event.title.clone())
        .collect()
}

/// Fixed reminders shown during the last days of every month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthEndReminders {
    pub reminders: Vec<String>,
    /// How many days before the last day of the month the reminders start.
    pub days: u32,
}

impl MonthEndReminders {
    pub fn new(reminders: Vec<String>, days: u32) -> Self {
        Self { reminders, days }
    }

    /// True once `date` is within `days` of the month's last day.
    pub fn is_active(&self, date: NaiveDate) -> bool {
        let last = last_day_of_month(date);
        date.day() + self.days >= last
    }

    /// The reminders due on `date`; empty outside the month-end stretch.
    pub fn due_on(&self, date: NaiveDate) -> &[String] {
        if self.is_active(date) {
            &self.reminders
        } else {
            &[]
        }
    }
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Today's agenda lines: calendar titles first, then any month-end reminders.
pub fn agenda_for(
    resolved: &[ResolvedOccurrenceSet<'_>],
    date: NaiveDate,
    reminders: &MonthEndReminders,
) -> Vec<String> {
    let mut items = todays_titles(resolved);
    items.extend(reminders.due_on(date).iter().cloned());
    items
}
