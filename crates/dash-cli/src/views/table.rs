use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use dash_core::timezone::format_with_timezone;

#[derive(Debug, Clone)]
pub struct ViewEvent {
    pub title: String,
    pub first_occurrence: DateTime<Utc>,
    pub occurrences: usize,
}

pub fn display_agenda(events: &[ViewEvent], timezone: &Tz) {
    if events.is_empty() {
        println!("Nothing on the calendar.");
        return;
    }
    println!("{}", agenda_table(events, timezone, Utc::now()));
}

fn agenda_table(events: &[ViewEvent], timezone: &Tz, now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Time", "Event", "Times today", "When"]);

    for event in events {
        let mut row = Row::new();
        row.add_cell(Cell::new(format_with_timezone(
            event.first_occurrence,
            timezone,
            "%H:%M %Z",
        )));

        let title_cell = Cell::new(&event.title);
        row.add_cell(if event.first_occurrence < now {
            title_cell.fg(Color::DarkGrey)
        } else {
            title_cell.add_attribute(Attribute::Bold)
        });

        let count_cell = Cell::new(event.occurrences);
        row.add_cell(if event.occurrences > 1 {
            count_cell.fg(Color::Yellow)
        } else {
            count_cell
        });

        row.add_cell(Cell::new(event.first_occurrence.humanize()));
        table.add_row(row);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_agenda_table_shows_local_time() {
        let events = vec![ViewEvent {
            title: "Dentist".to_string(),
            first_occurrence: Utc.with_ymd_and_hms(2026, 10, 17, 7, 30, 0).unwrap(),
            occurrences: 1,
        }];
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 6, 0, 0).unwrap();

        let rendered = agenda_table(&events, &chrono_tz::Europe::Berlin, now).to_string();
        assert!(rendered.contains("Dentist"));
        assert!(rendered.contains("09:30 CEST"));
    }

    #[test]
    fn test_agenda_table_counts_repeats() {
        let first = Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap();
        let events = vec![ViewEvent {
            title: "Stretch".to_string(),
            first_occurrence: first,
            occurrences: 24,
        }];

        let rendered = agenda_table(&events, &chrono_tz::UTC, first).to_string();
        assert!(rendered.contains("00:00 UTC"));
        assert!(rendered.contains("24"));
    }
}
