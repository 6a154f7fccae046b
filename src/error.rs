//! Error types shared across the crate.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AlarmError {
    #[error("alarm time {trigger} is not after {now}")]
    InvalidSchedule {
        trigger: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    #[error("note {0} does not exist")]
    NoteNotFound(Uuid),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
