//! Read access to the calendar snapshot.
//!
//! The calendar application keeps its database open while it runs, so a
//! direct read may fail with a lock error. In that case the snapshot is copied
//! to a scratch directory and the copy is opened instead.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::CoreError;

// Re-export the pool for use in other parts of the core crate
pub use sqlx::SqlitePool as DbPool;

/// Minimal read used only to confirm the handle is usable.
pub const PROBE_QUERY: &str = "SELECT COUNT(*) FROM cal_alarms";

/// How a snapshot handle should be acquired.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Where the fallback copy goes. Defaults to the OS temp directory.
    pub scratch_dir: Option<PathBuf>,
    /// How long SQLite waits on a lock before the probe gives up.
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            busy_timeout: Duration::from_millis(1000),
        }
    }
}

impl StoreOptions {
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Location of the fallback copy for `snapshot`: same base name, scratch directory.
    pub fn scratch_path_for(&self, snapshot: &Path) -> Option<PathBuf> {
        snapshot.file_name().map(|name| self.scratch_dir().join(name))
    }
}

/// Which acquisition strategy produced a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    /// The configured file was readable in place.
    Direct,
    /// The configured file was copied and the copy opened.
    ScratchCopy { path: PathBuf },
}

/// An opened, probed calendar snapshot.
#[derive(Debug)]
pub struct CalendarStore {
    pool: DbPool,
    origin: PathBuf,
    source: SnapshotSource,
}

impl CalendarStore {
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// The configured snapshot path, regardless of which file was opened.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn source(&self) -> &SnapshotSource {
        &self.source
    }

    /// The file actually backing this handle.
    pub fn opened_path(&self) -> &Path {
        match &self.source {
            SnapshotSource::Direct => &self.origin,
            SnapshotSource::ScratchCopy { path } => path,
        }
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Opens the calendar snapshot at `path`.
///
/// Tries the file in place first. If opening or probing fails for any reason
/// the file is copied into the scratch directory and the copy is tried. The
/// copy is left in place afterwards; the next run overwrites it.
///
/// # Errors
///
/// `CoreError::StoreUnavailable` when both attempts fail.
pub async fn open_snapshot(path: &Path, options: &StoreOptions) -> Result<CalendarStore, CoreError> {
    let direct = match connect_and_probe(path, options).await {
        Ok(pool) => {
            info!(path = %path.display(), "opened calendar snapshot in place");
            return Ok(CalendarStore {
                pool,
                origin: path.to_path_buf(),
                source: SnapshotSource::Direct,
            });
        }
        Err(e) => e.to_string(),
    };

    warn!(path = %path.display(), error = %direct, "calendar snapshot not readable in place, trying a scratch copy");

    let fallback = match copy_to_scratch(path, options).await {
        Err(reason) => reason,
        Ok(scratch) => match connect_and_probe(&scratch, options).await {
            Ok(pool) => {
                info!(path = %scratch.display(), "opened scratch copy of calendar snapshot");
                return Ok(CalendarStore {
                    pool,
                    origin: path.to_path_buf(),
                    source: SnapshotSource::ScratchCopy { path: scratch },
                });
            }
            Err(e) => e.to_string(),
        },
    };

    Err(CoreError::StoreUnavailable {
        path: path.to_path_buf(),
        direct,
        fallback,
    })
}

async fn connect_and_probe(path: &Path, options: &StoreOptions) -> Result<SqlitePool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .busy_timeout(options.busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await?;

    match sqlx::query_scalar::<_, i64>(PROBE_QUERY).fetch_one(&pool).await {
        Ok(alarms) => {
            debug!(path = %path.display(), alarms, "probe query succeeded");
            Ok(pool)
        }
        Err(e) => {
            pool.close().await;
            Err(e)
        }
    }
}

async fn copy_to_scratch(path: &Path, options: &StoreOptions) -> Result<PathBuf, String> {
    let scratch = options
        .scratch_path_for(path)
        .ok_or_else(|| format!("'{}' has no file name", path.display()))?;

    tokio::fs::create_dir_all(options.scratch_dir())
        .await
        .map_err(|e| format!("cannot create scratch directory '{}': {}", options.scratch_dir().display(), e))?;

    // Copying a file onto itself would truncate it
    if is_same_file(path, &scratch).await {
        return Err(format!(
            "scratch copy '{}' would overwrite the snapshot itself",
            scratch.display()
        ));
    }

    let bytes = tokio::fs::copy(path, &scratch)
        .await
        .map_err(|e| format!("copy to '{}' failed: {}", scratch.display(), e))?;
    debug!(from = %path.display(), to = %scratch.display(), bytes, "copied calendar snapshot");

    Ok(scratch)
}

async fn is_same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_path_keeps_base_name() {
        let options = StoreOptions {
            scratch_dir: Some(PathBuf::from("/var/tmp/dash")),
            ..Default::default()
        };
        let scratch = options.scratch_path_for(Path::new("/home/me/.thunderbird/p/calendar-data/local.sqlite"));
        assert_eq!(scratch, Some(PathBuf::from("/var/tmp/dash/local.sqlite")));
    }

    #[test]
    fn test_scratch_dir_defaults_to_temp_dir() {
        let options = StoreOptions::default();
        assert_eq!(options.scratch_dir(), std::env::temp_dir());
        assert_eq!(options.busy_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_scratch_path_requires_file_name() {
        assert_eq!(StoreOptions::default().scratch_path_for(Path::new("/")), None);
    }

    #[tokio::test]
    async fn test_opened_path_follows_source() {
        let pool = SqlitePoolOptions::new()
            .connect_lazy("sqlite::memory:")
            .expect("lazy pool");
        let store = CalendarStore {
            pool,
            origin: PathBuf::from("/data/local.sqlite"),
            source: SnapshotSource::ScratchCopy {
                path: PathBuf::from("/tmp/local.sqlite"),
            },
        };
        assert_eq!(store.opened_path(), Path::new("/tmp/local.sqlite"));
        assert_eq!(store.origin(), Path::new("/data/local.sqlite"));
    }
}
