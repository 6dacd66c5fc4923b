// src/error.rs

use crate::models::LogEntry;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoolError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database Error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Serialization Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Editor exited with a non-zero status")]
    EditorError,

    /// The entry was recorded in memory but could not be written to storage.
    #[error("Entry recorded but not saved: {source}")]
    Diverged {
        entry: Box<LogEntry>,
        #[source]
        source: Box<StoolError>,
    },
}

pub type Result<T> = std::result::Result<T, StoolError>;
