use anyhow::Result;
use dash_core::repository::{EventSource, SqliteEventSource};
use dash_core::store::{open_snapshot, SnapshotSource};
use owo_colors::OwoColorize;

use crate::config::Config;

pub async fn probe_snapshot(config: &Config) -> Result<()> {
    let database = config.calendar.database()?;
    let store = open_snapshot(database, &config.calendar.store_options()).await?;

    match store.source() {
        SnapshotSource::Direct => {
            println!("{} opened {} directly", "✓".green(), store.origin().display());
        }
        SnapshotSource::ScratchCopy { path } => {
            println!(
                "{} {} is locked or unreadable; using scratch copy {}",
                "✓".yellow(),
                store.origin().display(),
                path.display()
            );
        }
    }

    let events = SqliteEventSource::from_store(&store).fetch_events().await?;
    println!("{} recurring event row(s) available", events.len());
    store.close().await;

    Ok(())
}
