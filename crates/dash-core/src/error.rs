use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Calendar snapshot '{}' is unavailable (direct open: {direct}; scratch copy: {fallback})", path.display())]
    StoreUnavailable {
        path: PathBuf,
        direct: String,
        fallback: String,
    },

    #[error("Malformed recurrence rule for event '{title}': {reason}")]
    MalformedRule { title: String, reason: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
