use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Builds a static morning dashboard page from your local calendar
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write the dashboard page
    Render(RenderCommand),
    /// Show what is on the calendar today
    Today(TodayCommand),
    /// Check that the calendar snapshot can be read
    Probe,
}

#[derive(Parser, Debug, Clone)]
pub struct RenderCommand {
    /// Render for another day (e.g. '2026-10-17', 'tomorrow')
    #[arg(short, long)]
    pub date: Option<String>,
    /// Write the page here instead of the configured path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct TodayCommand {
    /// Show another day (e.g. '2026-10-17', 'next friday')
    #[arg(short, long)]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["morning-dash", "today", "-vv", "--config", "dash.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("dash.toml")));
        assert!(matches!(cli.command, Commands::Today(TodayCommand { date: None })));
    }

    #[test]
    fn test_render_options() {
        let cli = Cli::try_parse_from(["morning-dash", "render", "--date", "tomorrow", "-o", "out.html"]).unwrap();
        match cli.command {
            Commands::Render(command) => {
                assert_eq!(command.date.as_deref(), Some("tomorrow"));
                assert_eq!(command.output, Some(PathBuf::from("out.html")));
            }
            other => panic!("Expected render, got {:?}", other),
        }
    }
}
