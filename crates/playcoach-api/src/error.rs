//! API error types.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use playcoach_gemini::GeminiError;
use playcoach_models::ModelError;
use playcoach_storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Send a POST request with a video file to analyze, or a GET request to view the analysis results.")]
    MethodNotAllowed,

    #[error("Gemini error: {0}")]
    Gemini(#[from] GeminiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Analysis error: {0}")]
    Model(#[from] ModelError),
}

impl ApiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::Gemini(GeminiError::InvalidInput(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Gemini(_) | ApiError::Storage(_) | ApiError::Model(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message sent to the client. Server-side details are replaced by a
    /// generic message when `hide_internal` is set.
    pub fn public_message(&self, hide_internal: bool) -> String {
        if hide_internal && self.status_code().is_server_error() {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }
}

static HIDE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Stop exposing internal error details in responses (production).
pub fn hide_internal_errors(hide: bool) {
    HIDE_INTERNAL_ERRORS.store(hide, Ordering::Relaxed);
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let error = self.public_message(HIDE_INTERNAL_ERRORS.load(Ordering::Relaxed));
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Fallback for unsupported methods on a route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture::CapturedLogs;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::invalid_input("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GeminiError::invalid_input("image/png")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GeminiError::NoJsonFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(StorageError::ListFailed("down".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_invalid_input_message_is_verbatim() {
        let err = ApiError::invalid_input("Invalid Content-Type. Expected video/*");
        assert_eq!(err.to_string(), "Invalid Content-Type. Expected video/*");
    }

    #[test]
    fn test_internal_details_hidden_in_production() {
        let err = ApiError::from(StorageError::ListFailed("redis down".into()));
        assert_eq!(err.public_message(true), "An internal error occurred");
        assert_eq!(err.public_message(false), "Storage error: List failed: redis down");

        let err = ApiError::invalid_input("No game name provided");
        assert_eq!(err.public_message(true), "No game name provided");
    }

    fn logged_response(err: ApiError) -> (StatusCode, String) {
        let logs = CapturedLogs::default();
        let status = {
            let _guard = logs.install();
            err.into_response().status()
        };
        (status, logs.text())
    }

    #[test]
    fn test_rejections_are_logged_as_warnings() {
        let (status, logs) =
            logged_response(ApiError::invalid_input("Invalid Content-Type. Expected video/*"));

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(logs.contains("WARN"), "{}", logs);
        assert!(logs.contains("Request rejected"), "{}", logs);
        assert!(logs.contains("status=400"), "{}", logs);
        assert!(logs.contains("Invalid Content-Type. Expected video/*"), "{}", logs);
    }

    #[test]
    fn test_server_errors_are_logged_as_errors() {
        let (status, logs) = logged_response(ApiError::from(StorageError::corrupt_record(
            "video_1.mp4",
            "missing field `mistakes`",
        )));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs.contains("ERROR"), "{}", logs);
        assert!(logs.contains("status=500"), "{}", logs);
        assert!(logs.contains("video_1.mp4"), "{}", logs);
    }
}
