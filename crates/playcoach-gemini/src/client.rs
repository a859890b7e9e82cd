//! Gemini REST client.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::activation::{wait_until_active, FileStatusSource};
use crate::config::GeminiConfig;
use crate::error::{GeminiError, GeminiResult};
use crate::types::{
    ActiveFile, Content, FileData, GenerateRequest, GenerateResponse, GenerationConfig, Part,
    RemoteFile, UploadResponse, UploadStartFile, UploadStartRequest,
};

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GeminiError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Upload video bytes with the resumable upload protocol.
    ///
    /// Returns the remote file handle, normally still in the PENDING state.
    /// Failures are not retried.
    pub async fn upload_video(
        &self,
        data: Bytes,
        mime_type: &str,
        display_name: &str,
    ) -> GeminiResult<RemoteFile> {
        if !mime_type.starts_with("video/") {
            return Err(GeminiError::invalid_input(format!(
                "expected a video/* content type, got {}",
                mime_type
            )));
        }

        info!(
            display_name = %display_name,
            bytes = data.len(),
            mime_type = %mime_type,
            "Uploading video to Gemini"
        );

        let start_url = format!("{}/upload/v1beta/files", self.config.base_url);
        let start = self
            .client
            .post(&start_url)
            .query(&[("key", self.config.api_key.as_str())])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", data.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&UploadStartRequest {
                file: UploadStartFile { display_name },
            })
            .send()
            .await?;

        if !start.status().is_success() {
            let status = start.status().as_u16();
            let body = start.text().await.unwrap_or_default();
            error!(status, "Gemini upload session start failed");
            return Err(GeminiError::upload_failed(status, body));
        }

        let session_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| GeminiError::unexpected_response("no x-goog-upload-url header"))?;

        debug!("Upload session opened, sending bytes");

        let finalize = self
            .client
            .post(&session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(data)
            .send()
            .await?;

        if !finalize.status().is_success() {
            let status = finalize.status().as_u16();
            let body = finalize.text().await.unwrap_or_default();
            error!(status, "Gemini upload finalize failed");
            return Err(GeminiError::upload_failed(status, body));
        }

        let uploaded: UploadResponse = finalize.json().await.map_err(|e| {
            GeminiError::unexpected_response(format!("Failed to parse upload response: {}", e))
        })?;

        info!(
            file = %uploaded.file.name,
            uri = %uploaded.file.uri,
            state = %uploaded.file.state,
            "Uploaded video, waiting for activation"
        );
        Ok(uploaded.file)
    }

    /// Get the current status of an uploaded file.
    pub async fn get_file(&self, name: &str) -> GeminiResult<RemoteFile> {
        let url = format!("{}/v1beta/{}", self.config.base_url, name);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(file = %name, status, "Failed to get file status");
            return Err(GeminiError::remote_request_failed(status, body));
        }

        response.json().await.map_err(|e| {
            GeminiError::unexpected_response(format!("Failed to parse file status: {}", e))
        })
    }

    /// Poll until `file` is ACTIVE using the configured policy.
    pub async fn wait_until_active(&self, file: &RemoteFile) -> GeminiResult<ActiveFile> {
        wait_until_active(self, &file.name, &self.config.activation_policy()).await
    }

    /// Ask the model to analyze an active video with `prompt`.
    ///
    /// Returns the first text part of the first candidate. The declared
    /// timeout is advisory to the remote service.
    pub async fn generate_analysis(&self, file: &ActiveFile, prompt: &str) -> GeminiResult<String> {
        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.config.base_url,
            self.config.model_path()
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::FileData {
                        file_data: FileData {
                            file_uri: file.uri.clone(),
                            mime_type: file.mime_type.clone(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                timeout: format!("{}s", self.config.generation_timeout.as_secs()),
            },
        };

        info!(file = %file.name, model = %self.config.model, "Sending video for analysis");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status, "Gemini API request failed");
            return Err(GeminiError::remote_request_failed(status, body));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            GeminiError::unexpected_response(format!("Failed to parse Gemini response: {}", e))
        })?;

        generated
            .first_text()
            .map(|t| t.to_string())
            .ok_or_else(|| GeminiError::unexpected_response("no text in first candidate"))
    }
}

#[async_trait]
impl FileStatusSource for GeminiClient {
    async fn file_status(&self, name: &str) -> GeminiResult<RemoteFile> {
        self.get_file(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> GeminiClient {
        let mut config = GeminiConfig::new("test-key");
        config.base_url = server.uri();
        config.poll_interval = Duration::from_millis(10);
        config.activation_timeout = Duration::from_millis(200);
        GeminiClient::new(config).unwrap()
    }

    fn active_file() -> ActiveFile {
        ActiveFile {
            name: "files/abc".to_string(),
            uri: "https://files.test/abc".to_string(),
            mime_type: "video/mp4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_video_resumable_flow() {
        let server = MockServer::start().await;
        let session_url = format!("{}/upload-session/1", server.uri());

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(query_param("key", "test-key"))
            .and(header("X-Goog-Upload-Command", "start"))
            .and(header("X-Goog-Upload-Header-Content-Type", "video/mp4"))
            .and(body_partial_json(json!({"file": {"display_name": "video_1.mp4"}})))
            .respond_with(ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload-session/1"))
            .and(header("X-Goog-Upload-Offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": {
                    "name": "files/abc",
                    "uri": "https://files.test/abc",
                    "mimeType": "video/mp4",
                    "state": "PROCESSING"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let file = client
            .upload_video(Bytes::from(vec![0u8; 16]), "video/mp4", "video_1.mp4")
            .await
            .unwrap();

        assert_eq!(file.name, "files/abc");
        assert_eq!(file.state, playcoach_models::FileState::Pending);
    }

    #[tokio::test]
    async fn test_upload_failure_carries_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server)
            .upload_video(Bytes::from_static(&[1, 2, 3]), "video/mp4", "v.mp4")
            .await
            .unwrap_err();

        match err {
            GeminiError::UploadFailed { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "quota");
            }
            other => panic!("expected UploadFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_non_video() {
        let server = MockServer::start().await;
        let err = test_client(&server)
            .upload_video(Bytes::from_static(&[1]), "image/png", "x.png")
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_wait_until_active_polls_status_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/abc",
                "uri": "https://files.test/abc",
                "mimeType": "video/mp4",
                "state": "PROCESSING"
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1beta/files/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "files/abc",
                "uri": "https://files.test/abc",
                "mimeType": "video/mp4",
                "state": "ACTIVE"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let pending = client.get_file("files/abc").await.unwrap();
        let active = client.wait_until_active(&pending).await.unwrap();

        assert_eq!(active.uri, "https://files.test/abc");
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_generate_analysis_returns_first_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [
                    {"text": "analyze"},
                    {"file_data": {"file_uri": "https://files.test/abc", "mime_type": "video/mp4"}}
                ]}],
                "generation_config": {"timeout": "600s"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "{\"game\": \"Chess\"}"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = test_client(&server)
            .generate_analysis(&active_file(), "analyze")
            .await
            .unwrap();

        assert_eq!(text, "{\"game\": \"Chess\"}");
    }

    #[tokio::test]
    async fn test_generate_analysis_unexpected_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .generate_analysis(&active_file(), "analyze")
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::UnexpectedResponseShape(_)));
    }

    #[tokio::test]
    async fn test_generate_analysis_remote_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .generate_analysis(&active_file(), "analyze")
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::RemoteRequestFailed { status: 500, .. }));
    }
}
