//! Gemini REST wire types.

use serde::{Deserialize, Serialize};

use playcoach_models::FileState;

/// File resource as returned by the Gemini file API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc123`
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Retrievable URI, present once the upload is finalized
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub state: FileState,
}

/// A file that finished remote processing and can be referenced in prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFile {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

/// Envelope of the finalize step of a resumable upload.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub file: RemoteFile,
}

/// Metadata sent when starting a resumable upload.
#[derive(Debug, Serialize)]
pub(crate) struct UploadStartRequest<'a> {
    pub file: UploadStartFile<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadStartFile<'a> {
    pub display_name: &'a str,
}

/// `generateContent` request.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    Text { text: String },
    FileData { file_data: FileData },
}

#[derive(Debug, Serialize)]
pub(crate) struct FileData {
    pub file_uri: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    /// Advisory processing timeout, e.g. `"600s"`
    pub timeout: String,
}

/// `generateContent` response. Every level is optional so that a missing
/// piece surfaces as a shape error instead of a decode error.
#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}
