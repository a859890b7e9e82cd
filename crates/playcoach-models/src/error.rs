//! Model error types.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    /// The value is JSON but does not have the full analysis shape.
    #[error("Incomplete analysis document: {0}")]
    IncompleteDocument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn incomplete(msg: impl Into<String>) -> Self {
        Self::IncompleteDocument(msg.into())
    }
}
