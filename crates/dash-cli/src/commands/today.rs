use anyhow::Result;
use owo_colors::OwoColorize;

use dash_core::store::SnapshotSource;

use crate::cli::TodayCommand;
use crate::commands::build_agenda;
use crate::config::Config;
use crate::views::table::{display_agenda, ViewEvent};

pub async fn show_today(config: &Config, command: TodayCommand) -> Result<()> {
    let agenda = build_agenda(&config.calendar, command.date.as_deref()).await?;

    println!("{}", format!("Calendar for {}", agenda.date).bold());
    if let SnapshotSource::ScratchCopy { path } = &agenda.source {
        println!("{}", format!("(read from scratch copy {})", path.display()).dimmed());
    }

    let view_events: Vec<ViewEvent> = agenda
        .entries
        .iter()
        .map(|entry| ViewEvent {
            title: entry.title.clone(),
            first_occurrence: entry.first_occurrence,
            occurrences: entry.occurrences,
        })
        .collect();
    display_agenda(&view_events, &agenda.timezone);

    for reminder in agenda.reminders() {
        println!("{} {}", "Reminder:".cyan().bold(), reminder);
    }

    for error in &agenda.summary.errors {
        eprintln!("{} {}", "Skipped:".yellow().bold(), error);
    }

    Ok(())
}
