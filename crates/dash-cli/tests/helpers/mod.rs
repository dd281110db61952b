use assert_cmd::Command;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Connection, SqliteConnection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// One calendar row: title, first start and the stored rule text
pub struct SnapshotEvent {
    pub title: &'static str,
    pub start: DateTime<Utc>,
    pub rule: &'static str,
}

pub fn event(title: &'static str, start: DateTime<Utc>, rule: &'static str) -> SnapshotEvent {
    SnapshotEvent { title, start, rule }
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Test harness for running the CLI against a snapshot in a temporary directory
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    /// Create a harness whose snapshot holds the given events
    pub fn with_events(events: &[SnapshotEvent]) -> Self {
        let harness = Self::empty();
        write_snapshot(&harness.db_path, events);
        harness
    }

    /// Create a harness without writing a snapshot
    pub fn empty() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("local.sqlite");
        Self { temp_dir, db_path }
    }

    /// Get a Command running inside the temp directory with a UTC calendar
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("morning-dash").expect("Failed to find morning-dash binary");
        cmd.current_dir(self.temp_dir.path())
            .env("MORNING_DASH_CALENDAR__DATABASE", &self.db_path)
            .env("MORNING_DASH_CALENDAR__TIMEZONE", "UTC")
            .env("MORNING_DASH_CALENDAR__SCRATCH_DIR", self.temp_dir.path().join("scratch"))
            .env("MORNING_DASH_OUTPUT__PATH", self.output_path())
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn output_path(&self) -> PathBuf {
        self.temp_dir.path().join("dashboard.html")
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_config(&self, contents: &str) {
        std::fs::write(self.temp_dir.path().join("config.toml"), contents)
            .expect("Failed to write config");
    }

    pub fn read_output(&self) -> String {
        std::fs::read_to_string(self.output_path()).expect("Dashboard was not written")
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }
}

/// Writes a calendar snapshot with the two tables the dashboard reads plus `cal_alarms`
fn write_snapshot(path: &Path, events: &[SnapshotEvent]) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    runtime.block_on(async {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Delete);
        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .expect("Failed to create snapshot");

        for ddl in [
            "CREATE TABLE cal_events (cal_id TEXT, id TEXT, title TEXT, event_start INTEGER, event_end INTEGER)",
            "CREATE TABLE cal_recurrence (cal_id TEXT, item_id TEXT, icalString TEXT)",
            "CREATE TABLE cal_alarms (cal_id TEXT, item_id TEXT, icalString TEXT)",
        ] {
            sqlx::query(ddl).execute(&mut conn).await.unwrap();
        }

        for (i, event) in events.iter().enumerate() {
            let id = format!("event-{}", i);
            let start = event.start.timestamp_micros();
            sqlx::query("INSERT INTO cal_events (cal_id, id, title, event_start, event_end) VALUES ('home', $1, $2, $3, $4)")
                .bind(&id)
                .bind(event.title)
                .bind(start)
                .bind(start + 1_800_000_000)
                .execute(&mut conn)
                .await
                .unwrap();
            sqlx::query("INSERT INTO cal_recurrence (cal_id, item_id, icalString) VALUES ('home', $1, $2)")
                .bind(&id)
                .bind(event.rule)
                .execute(&mut conn)
                .await
                .unwrap();
        }

        conn.close().await.unwrap();
    });
}
