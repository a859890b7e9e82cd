//! Shared data models for the PlayCoach backend.
//!
//! This crate provides:
//! - The structured mistake analysis returned by the model
//! - Remote file lifecycle states
//! - Stored record naming
//! - Plain-text and HTML report rendering

pub mod analysis;
pub mod error;
pub mod file_state;
pub mod report;
pub mod video;

// Re-export common types
pub use analysis::{AnalysisDocument, MissedOpportunity, Mistake, RepeatedError};
pub use error::{ModelError, ModelResult};
pub use file_state::FileState;
pub use report::{escape_html, format_analysis, render_html};
pub use video::VideoName;
