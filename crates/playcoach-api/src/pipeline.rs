//! Video analysis pipeline.
//!
//! A request moves through `Received -> Stored -> Uploaded -> Activated ->
//! Analyzed -> Persisted -> Responded`. A failure at any step ends the
//! request; the result store is only written once analysis succeeded, so a
//! failed request never leaves a record behind.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use tracing::Instrument;

use playcoach_gemini::{build_prompt, extract_json, ActiveFile, GeminiClient};
use playcoach_models::{AnalysisDocument, VideoName};
use playcoach_storage::{BlobStore, ResultStore};

use crate::error::{ApiError, ApiResult};
use crate::logging::RequestLogger;
use crate::metrics;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Stored,
    Uploaded,
    Activated,
    Analyzed,
    Persisted,
    Responded,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Stored => "stored",
            Stage::Uploaded => "uploaded",
            Stage::Activated => "activated",
            Stage::Analyzed => "analyzed",
            Stage::Persisted => "persisted",
            Stage::Responded => "responded",
        }
    }
}

/// A submitted video and its analysis parameters.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Request body, shared between the blob store and the upload
    pub video: Bytes,
    pub mime_type: String,
    pub game_name: String,
    pub focus_on: Option<String>,
}

/// Runs one analysis end to end.
pub struct AnalysisPipeline {
    gemini: Arc<GeminiClient>,
    blobs: Option<Arc<dyn BlobStore>>,
    results: ResultStore,
}

impl AnalysisPipeline {
    pub fn new(
        gemini: Arc<GeminiClient>,
        blobs: Option<Arc<dyn BlobStore>>,
        results: ResultStore,
    ) -> Self {
        Self {
            gemini,
            blobs,
            results,
        }
    }

    /// Analyze `request` under a freshly generated video name.
    pub async fn run(&self, request: AnalysisRequest) -> ApiResult<VideoName> {
        self.run_as(VideoName::generate(), request).await
    }

    /// Analyze `request` and persist the result under `name`.
    pub async fn run_as(&self, name: VideoName, request: AnalysisRequest) -> ApiResult<VideoName> {
        let log = RequestLogger::new(&name);
        let started = Instant::now();

        let outcome = self
            .execute(&name, request, &log)
            .instrument(log.create_span())
            .await;

        match outcome {
            Ok(()) => {
                metrics::record_analysis_completed(started.elapsed().as_secs_f64());
                Ok(name)
            }
            Err((stage, err)) => {
                log.failed(stage, &err);
                metrics::record_analysis_failed(stage.as_str());
                Err(err)
            }
        }
    }

    /// Each error is tagged with the stage that was being attempted.
    async fn execute(
        &self,
        name: &VideoName,
        request: AnalysisRequest,
        log: &RequestLogger,
    ) -> Result<(), (Stage, ApiError)> {
        let AnalysisRequest {
            video,
            mime_type,
            game_name,
            focus_on,
        } = request;

        if !mime_type.starts_with("video/") {
            return Err((
                Stage::Received,
                ApiError::invalid_input("Invalid Content-Type. Expected video/*"),
            ));
        }
        if video.is_empty() {
            return Err((Stage::Received, ApiError::invalid_input("No video file provided")));
        }
        log.stage(
            Stage::Received,
            &format!("Received {} bytes of {} for {}", video.len(), mime_type, game_name),
        );

        match &self.blobs {
            Some(blobs) => {
                blobs
                    .put(&name.blob_key(), video.clone(), &mime_type)
                    .await
                    .map_err(|e| (Stage::Stored, ApiError::from(e)))?;
                log.stage(Stage::Stored, "Stored raw video");
            }
            None => log.warning(Stage::Stored, "No blob store configured, skipping raw video storage"),
        }

        let remote = self
            .gemini
            .upload_video(video, &mime_type, name.as_str())
            .await
            .map_err(|e| (Stage::Uploaded, ApiError::from(e)))?;
        log.stage(Stage::Uploaded, &format!("Uploaded as {}", remote.name));

        let activation_started = Instant::now();
        let active = self
            .gemini
            .wait_until_active(&remote)
            .await
            .map_err(|e| (Stage::Activated, ApiError::from(e)))?;
        metrics::record_activation_wait(activation_started.elapsed().as_secs_f64());
        log.stage(Stage::Activated, "Remote file is active");

        let prompt = build_prompt(&game_name, focus_on.as_deref());
        let document = self
            .analyze(&active, &prompt)
            .await
            .map_err(|e| (Stage::Analyzed, e))?;
        log.stage(
            Stage::Analyzed,
            &format!(
                "Found {} mistakes, {} repeated errors, {} missed opportunities",
                document.mistakes.len(),
                document.repeated_errors.len(),
                document.missed_opportunities.len()
            ),
        );

        self.results
            .put(name, &document)
            .await
            .map_err(|e| (Stage::Persisted, ApiError::from(e)))?;
        log.stage(Stage::Persisted, "Analysis stored");

        Ok(())
    }

    async fn analyze(
        &self,
        file: &ActiveFile,
        prompt: &str,
    ) -> ApiResult<AnalysisDocument> {
        let text = self.gemini.generate_analysis(file, prompt).await?;
        let value = extract_json(&text)?;
        Ok(AnalysisDocument::from_value(value)?)
    }
}
