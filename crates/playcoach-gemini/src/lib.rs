//! Gemini client for gameplay video analysis.
//!
//! This crate provides:
//! - Video upload through the Gemini resumable file API
//! - Fixed-interval polling until an uploaded file is ACTIVE
//! - `generateContent` requests combining the prompt and the video
//! - The coaching prompt template
//! - Extraction of the JSON object embedded in model output

pub mod activation;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod types;

pub use activation::{wait_until_active, ActivationPolicy, ActivationState, FileStatusSource};
pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use error::{GeminiError, GeminiResult};
pub use extract::extract_json;
pub use prompt::build_prompt;
pub use types::{ActiveFile, RemoteFile};
