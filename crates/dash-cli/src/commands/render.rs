use anyhow::{Context, Result};
use dash_core::render::{calendar_panel, render_page};
use owo_colors::OwoColorize;

use crate::cli::RenderCommand;
use crate::commands::build_agenda;
use crate::config::Config;

pub async fn render_dashboard(config: &Config, command: RenderCommand) -> Result<()> {
    // Any calendar failure aborts before the page is touched
    let agenda = build_agenda(&config.calendar, command.date.as_deref()).await?;

    let panels = [calendar_panel(&agenda.items)];
    let page = render_page(&config.output.page_options(), &panels);

    let output = command.output.unwrap_or_else(|| config.output.path.clone());
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    tokio::fs::write(&output, page)
        .await
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    if agenda.items.is_empty() {
        println!("Nothing on the calendar for {}.", agenda.date);
    } else {
        println!("{} calendar item(s) for {}.", agenda.items.len(), agenda.date);
    }
    if agenda.summary.events_skipped > 0 {
        eprintln!(
            "{} skipped {} event(s) with malformed recurrence rules",
            "Warning:".yellow().bold(),
            agenda.summary.events_skipped
        );
    }
    println!("Wrote dashboard to {}", output.display().green());

    Ok(())
}
