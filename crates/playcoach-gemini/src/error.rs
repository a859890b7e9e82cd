//! Gemini client error types.

use std::time::Duration;

use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Video upload failed with status {status}: {body}")]
    UploadFailed { status: u16, body: String },

    #[error("Gemini request failed with status {status}: {body}")]
    RemoteRequestFailed { status: u16, body: String },

    #[error("Unexpected Gemini response: {0}")]
    UnexpectedResponseShape(String),

    #[error("No JSON object found in model response")]
    NoJsonFound,

    #[error("Malformed JSON in model response: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("File {name} did not become ACTIVE within {}s", .waited.as_secs())]
    ActivationTimedOut { name: String, waited: Duration },

    #[error("Remote processing failed for file {0}")]
    ActivationFailed(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl GeminiError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn upload_failed(status: u16, body: impl Into<String>) -> Self {
        Self::UploadFailed {
            status,
            body: body.into(),
        }
    }

    pub fn remote_request_failed(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteRequestFailed {
            status,
            body: body.into(),
        }
    }

    pub fn unexpected_response(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponseShape(msg.into())
    }

    /// HTTP status returned by the remote service, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            GeminiError::UploadFailed { status, .. }
            | GeminiError::RemoteRequestFailed { status, .. } => Some(*status),
            GeminiError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
