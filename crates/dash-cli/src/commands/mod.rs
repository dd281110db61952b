// One submodule per subcommand; the calendar pipeline they share lives here.

pub mod probe;
pub mod render;
pub mod today;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use dash_core::agenda::agenda_for;
use dash_core::recurrence::{RecurrenceResolver, ResolutionSummary};
use dash_core::repository::{EventSource, SqliteEventSource};
use dash_core::store::{open_snapshot, SnapshotSource};
use dash_core::window::DayWindow;
use tracing::info;

use crate::config::CalendarConfig;
use crate::parser::day_or_today;

/// An event that happens on the agenda day.
#[derive(Debug, Clone)]
pub struct AgendaEntry {
    pub title: String,
    pub first_occurrence: DateTime<Utc>,
    pub occurrences: usize,
}

/// Everything a run learned about one day of the calendar.
#[derive(Debug, Clone)]
pub struct Agenda {
    pub date: NaiveDate,
    pub timezone: Tz,
    /// Occurring events in row order
    pub entries: Vec<AgendaEntry>,
    /// Panel lines: event titles followed by month-end reminders
    pub items: Vec<String>,
    pub summary: ResolutionSummary,
    pub source: SnapshotSource,
}

impl Agenda {
    pub fn reminders(&self) -> &[String] {
        &self.items[self.entries.len()..]
    }
}

/// Opens the snapshot, reads every event once and resolves it against the day window.
pub async fn build_agenda(config: &CalendarConfig, date: Option<&str>) -> Result<Agenda> {
    let timezone = config.timezone()?;
    let date = day_or_today(date, &timezone)?;
    let database = config.database()?;

    let store = open_snapshot(database, &config.store_options()).await?;
    let source = store.source().clone();
    let events = SqliteEventSource::from_store(&store).fetch_events().await?;
    store.close().await;

    let resolver = RecurrenceResolver::new(timezone, DayWindow::for_date(date, &timezone))
        .with_max_occurrences(config.max_occurrences)
        .with_policy(config.malformed_rules);
    let resolution = resolver.resolve_all(&events)?;

    let entries: Vec<AgendaEntry> = resolution
        .sets
        .iter()
        .filter_map(|set| {
            set.first_occurrence().map(|first| AgendaEntry {
                title: set.event.title.clone(),
                first_occurrence: first,
                occurrences: set.occurrences.len(),
            })
        })
        .collect();
    let items = agenda_for(&resolution.sets, date, &config.reminders());

    info!(
        %date,
        events = resolution.summary.events_processed,
        occurring = resolution.summary.events_occurring,
        skipped = resolution.summary.events_skipped,
        duration_ms = resolution.summary.duration_ms,
        "calendar resolved"
    );

    Ok(Agenda {
        date,
        timezone,
        entries,
        items,
        summary: resolution.summary,
        source,
    })
}
