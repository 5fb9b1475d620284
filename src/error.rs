use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read catalog fixture: {0}")]
    Fixture(serde_json::Error),

    #[error("Failed to serialize document: {0}")]
    Serialization(serde_json::Error),

    #[error("Batch of {size} writes exceeds the store limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Batch commit failed: {0}")]
    CommitFailed(String),

    #[error("Batch commit timed out after {0:?}")]
    CommitTimeout(Duration),
}
