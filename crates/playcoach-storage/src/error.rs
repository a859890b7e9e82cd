//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure storage client: {0}")]
    ConfigError(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Failed to persist {key}: {reason}")]
    PersistenceFailed { key: String, reason: String },

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Stored record {key} is corrupt: {reason}")]
    CorruptRecord { key: String, reason: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    pub fn persistence_failed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::PersistenceFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn corrupt_record(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::CorruptRecord {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}
