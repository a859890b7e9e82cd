//! Video submission and analysis views.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use playcoach_models::{format_analysis, render_html, VideoName};

use crate::error::{ApiError, ApiResult};
use crate::logging::RequestLogger;
use crate::pipeline::{AnalysisRequest, Stage};
use crate::state::AppState;

/// MIME type assumed for a multipart video part without one.
const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Query parameters of a raw video upload.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitParams {
    pub game: Option<String>,
    pub focus: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
    pub video_name: String,
}

/// Submit a gameplay video for analysis.
///
/// Accepts either a raw `video/*` body (game and focus from the query
/// string) or a `multipart/form-data` body with `video`, `gameName` and an
/// optional `focusOn` field.
pub async fn submit_analysis(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    request: Request,
) -> ApiResult<Json<SubmitResponse>> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_default();

    let analysis = if content_type.starts_with("multipart/form-data") {
        read_multipart(request, &state).await?
    } else {
        read_raw(request, &state, &content_type, params).await?
    };

    let name = state.pipeline.run(analysis).await?;
    RequestLogger::new(&name).stage(Stage::Responded, "Analysis complete");

    Ok(Json(SubmitResponse {
        message: "Video uploaded and analysis stored".to_string(),
        video_name: name.to_string(),
    }))
}

async fn read_raw(
    request: Request,
    state: &AppState,
    content_type: &str,
    params: SubmitParams,
) -> ApiResult<AnalysisRequest> {
    let mime_type = content_type.split(';').next().unwrap_or_default().trim();
    if !mime_type.starts_with("video/") {
        return Err(ApiError::invalid_input("Invalid Content-Type. Expected video/*"));
    }

    let body = Bytes::from_request(request, state).await.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::invalid_input(rejection.body_text())
        }
    })?;

    Ok(AnalysisRequest {
        video: body,
        mime_type: mime_type.to_string(),
        game_name: non_blank(params.game).unwrap_or_else(|| state.config.default_game.clone()),
        focus_on: non_blank(params.focus),
    })
}

async fn read_multipart(request: Request, state: &AppState) -> ApiResult<AnalysisRequest> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;

    let mut video: Option<(Bytes, String)> = None;
    let mut game_name: Option<String> = None;
    let mut focus_on: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("video") => {
                let mime_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_VIDEO_MIME)
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                debug!(bytes = data.len(), mime_type = %mime_type, "Read video part");
                video = Some((data, mime_type));
            }
            Some("gameName") => game_name = Some(field.text().await.map_err(multipart_error)?),
            Some("focusOn") => focus_on = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let (video, mime_type) = video
        .filter(|(data, _)| !data.is_empty())
        .ok_or_else(|| ApiError::invalid_input("No video file provided"))?;
    let game_name =
        non_blank(game_name).ok_or_else(|| ApiError::invalid_input("No game name provided"))?;

    Ok(AnalysisRequest {
        video,
        mime_type,
        game_name,
        focus_on: non_blank(focus_on),
    })
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::invalid_input(format!("Invalid multipart body: {}", err.body_text()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Render every stored analysis as an HTML page.
///
/// Records that cannot be loaded are logged and left out of the page.
pub async fn list_analyses(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let keys = state.results.list_keys().await?;

    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        match state.results.get(&key).await {
            Ok(Some(document)) => entries.push((key, format_analysis(&document))),
            Ok(None) => debug!(video_name = %key, "Analysis vanished while listing"),
            Err(e) => error!(video_name = %key, error = %e, "Skipping unreadable analysis"),
        }
    }

    info!(count = entries.len(), "Rendering analyses page");

    Ok((
        [(header::CONTENT_TYPE, "text/html;charset=UTF-8")],
        render_html(&entries),
    ))
}

/// One stored analysis as plain text.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let video_name = VideoName::from_string(name);

    let document = state
        .results
        .get(video_name.as_str())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("analysis {}", video_name)))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format_analysis(&document),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Chess ".to_string())).as_deref(), Some("Chess"));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }
}
