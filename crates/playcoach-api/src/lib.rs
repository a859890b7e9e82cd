//! Axum HTTP API for gameplay video analysis.
//!
//! This crate provides:
//! - Video submission (raw `video/*` body or multipart form)
//! - The analysis pipeline: store, upload, activate, analyze, persist
//! - HTML and plain-text views of stored analyses
//! - Health, readiness and Prometheus metrics endpoints

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use pipeline::{AnalysisPipeline, AnalysisRequest, Stage};
pub use routes::create_router;
pub use state::AppState;
