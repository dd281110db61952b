use clap::Parser;
use dash_core::error::CoreError;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod timezone;
mod views;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    let config = match config::Config::new(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            handle_error(e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        cli::Commands::Render(command) => {
            commands::render::render_dashboard(&config, command).await
        }
        cli::Commands::Today(command) => commands::today::show_today(&config, command).await,
        cli::Commands::Probe => commands::probe::probe_snapshot(&config).await,
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("morning_dash={level},dash_core={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();
    let core_error = err.chain().find_map(|e| e.downcast_ref::<CoreError>());

    match core_error {
        Some(CoreError::StoreUnavailable { path, direct, fallback }) => {
            eprintln!(
                "{} Calendar snapshot '{}' is unavailable",
                "Error:".style(error_style),
                path.display().yellow()
            );
            eprintln!("  direct open:  {}", direct);
            eprintln!("  scratch copy: {}", fallback);
        }
        Some(CoreError::MalformedRule { title, reason }) => {
            eprintln!(
                "{} Malformed recurrence rule for '{}': {}",
                "Error:".style(error_style),
                title.yellow(),
                reason
            );
            eprintln!("Set calendar.malformed_rules = \"skip\" to render the remaining events.");
        }
        Some(CoreError::InvalidTimezone(name)) => {
            eprintln!(
                "{} Invalid timezone: {}",
                "Error:".style(error_style),
                name.yellow()
            );
            let suggestions = timezone::suggest_timezone(name);
            if !suggestions.is_empty() {
                eprintln!("Did you mean one of these?");
                for suggestion in suggestions {
                    eprintln!("  {}", suggestion.green());
                }
            }
        }
        Some(CoreError::Database(e)) => {
            eprintln!("{} Database error: {}", "Error:".style(error_style), e);
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
