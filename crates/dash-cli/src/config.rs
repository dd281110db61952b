use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use dash_core::agenda::MonthEndReminders;
use dash_core::recurrence::{MalformedRulePolicy, DEFAULT_MAX_OCCURRENCES};
use dash_core::render::PageOptions;
use dash_core::store::StoreOptions;
use dash_core::timezone::parse_timezone;
use figment::{providers::{Env, Format, Json, Toml}, Figment};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::timezone::detect_system_timezone;

pub const ENV_PREFIX: &str = "MORNING_DASH_";

#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the calendar snapshot lives and how its rules are evaluated
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct CalendarConfig {
    /// Path to the calendar's SQLite snapshot
    pub database: Option<PathBuf>,
    /// Directory for the fallback copy (OS temp directory when unset)
    pub scratch_dir: Option<PathBuf>,
    /// User's timezone (IANA format)
    pub timezone: String,
    /// Lock wait before falling back to a copy
    pub busy_timeout_ms: u64,
    /// Occurrences collected per event
    pub max_occurrences: usize,
    /// `fail` aborts the run on a bad rule, `skip` leaves the event out
    pub malformed_rules: MalformedRulePolicy,
    /// Shown during the last days of each month
    pub month_end_reminders: Vec<String>,
    pub month_end_days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            database: None,
            scratch_dir: None,
            timezone: detect_system_timezone(),
            busy_timeout_ms: 1000,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            malformed_rules: MalformedRulePolicy::Fail,
            month_end_reminders: Vec::new(),
            month_end_days: 7,
        }
    }
}

impl CalendarConfig {
    pub fn database(&self) -> Result<&Path> {
        self.database.as_deref().ok_or_else(|| {
            anyhow!(
                "calendar.database is not configured (set it in config.toml or {}CALENDAR__DATABASE)",
                ENV_PREFIX
            )
        })
    }

    pub fn timezone(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.timezone)?)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            scratch_dir: self.scratch_dir.clone(),
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }

    pub fn reminders(&self) -> MonthEndReminders {
        MonthEndReminders::new(self.month_end_reminders.clone(), self.month_end_days)
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the rendered page is written
    pub path: PathBuf,
    pub title: String,
    pub stylesheet: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let page = PageOptions::default();
        Self {
            path: PathBuf::from("dashboard.html"),
            title: page.title,
            stylesheet: page.stylesheet,
        }
    }
}

impl OutputConfig {
    pub fn page_options(&self) -> PageOptions {
        PageOptions {
            title: self.title.clone(),
            stylesheet: self.stylesheet.clone(),
        }
    }
}

impl Config {
    /// Layered sources: the explicit file or `config.toml` then `config.json`,
    /// with `MORNING_DASH_` environment variables on top.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let figment = match explicit {
            Some(path) if is_json(path) => Figment::new().merge(Json::file(path)),
            Some(path) => Figment::new().merge(Toml::file(path)),
            None => Figment::new()
                .merge(Toml::file("config.toml"))
                .merge(Json::file("config.json")),
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn new(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(anyhow!("Configuration file '{}' does not exist", path.display()));
            }
        }
        Ok(Self::figment(explicit).extract()?)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
