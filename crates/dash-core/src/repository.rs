use async_trait::async_trait;
use tracing::debug;

use crate::error::CoreError;
use crate::models::CalendarEvent;
use crate::store::{CalendarStore, DbPool};

/// Joins events to their recurrence rows.
///
/// Events without a recurrence row are not part of the result.
pub const EVENTS_QUERY: &str = r#"SELECT
    COALESCE(e.title, '') AS title,
    e.event_start AS start_micros,
    COALESCE(e.event_end, e.event_start) AS end_micros,
    r.icalString AS recurrence_rule
FROM cal_events e
JOIN cal_recurrence r ON r.item_id = e.id"#;

/// Anything that can hand over the raw calendar rows for one run.
#[async_trait]
pub trait EventSource {
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, CoreError>;
}

pub struct SqliteEventSource {
    pool: DbPool,
}

impl SqliteEventSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn from_store(store: &CalendarStore) -> Self {
        Self::new(store.pool().clone())
    }
}

#[async_trait]
impl EventSource for SqliteEventSource {
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, CoreError> {
        let events: Vec<CalendarEvent> = sqlx::query_as(EVENTS_QUERY)
            .fetch_all(&self.pool)
            .await?;
        debug!(count = events.len(), "fetched calendar rows");
        Ok(events)
    }
}

/// A fixed list of rows, for callers that already have them in memory.
#[async_trait]
impl EventSource for Vec<CalendarEvent> {
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, CoreError> {
        Ok(self.clone())
    }
}
