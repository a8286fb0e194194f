use anyhow::Result;
use axum::extract::{Json, State};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::diff::{compute_diff, render, DiffOp, RenderMode, StyledSegment};
use crate::llm::generate_llm_response;
use crate::prompt::{detection_transcript, rewrite_transcript};
use crate::response::{parse_extraction, parse_rewrite, Extraction};
use crate::{LLMParams, TARGET_WEB_REQUEST};

pub struct AppState {
    pub llm_params: LLMParams,
}

#[derive(Deserialize)]
pub struct ImproveRequest {
    text: String,
    instructions: Option<String>,
    #[serde(default)]
    mode: RenderMode,
}

#[derive(Serialize)]
pub struct ImproveResponse {
    improvement: String,
    diff: Vec<DiffOp>,
    segments: Vec<StyledSegment>,
}

#[derive(Deserialize)]
pub struct DetectionRequest {
    text: String,
}

#[derive(Serialize)]
pub struct DetectionResponse {
    text: String,
    raw: String,
    detection: Option<Extraction>,
}

pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    // Build the Axum router
    let app = Router::new()
        .route("/status", get(status_check))
        .route("/api/improve", post(improve))
        .route("/api/date-detection", post(date_detection))
        .with_state(Arc::new(state));

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Status check endpoint: replies with "OK"
async fn status_check() -> &'static str {
    "OK"
}

/// Rewrites the submitted text and returns it with a diff against the
/// original, rendered in the requested mode. Never fails: a dead backend
/// degrades to the placeholder text diffed like any other revision.
async fn improve(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImproveRequest>,
) -> Json<ImproveResponse> {
    info!(target: TARGET_WEB_REQUEST, "Handling improve request ({} bytes)", payload.text.len());

    let transcript = rewrite_transcript(&payload.text, payload.instructions.as_deref());
    let completion = generate_llm_response(&transcript, &state.llm_params).await;
    let improvement = parse_rewrite(completion);

    let diff = compute_diff(&payload.text, &improvement);
    let segments = render(&diff, payload.mode);

    Json(ImproveResponse {
        improvement,
        diff,
        segments,
    })
}

/// Detects a date expression in the submitted text. A missing or malformed
/// completion yields `detection: null`, which the caller renders as the
/// neutral "no date detected" state.
async fn date_detection(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DetectionRequest>,
) -> Json<DetectionResponse> {
    info!(target: TARGET_WEB_REQUEST, "Handling date-detection request ({} bytes)", payload.text.len());

    let transcript = detection_transcript(&payload.text);
    let raw = generate_llm_response(&transcript, &state.llm_params)
        .await
        .unwrap_or_default();
    let detection = parse_extraction(&raw, &payload.text);

    Json(DetectionResponse {
        text: payload.text,
        raw,
        detection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improve_request_mode_defaults_to_diff() {
        let request: ImproveRequest =
            serde_json::from_str(r#"{"text": "some words"}"#).unwrap();
        assert_eq!(request.mode, RenderMode::Diff);
        assert!(request.instructions.is_none());
    }

    #[test]
    fn improve_request_accepts_instructions_and_mode() {
        let request: ImproveRequest = serde_json::from_str(
            r#"{"text": "some words", "instructions": "Keep it short", "mode": "diff-overwrite"}"#,
        )
        .unwrap();
        assert_eq!(request.mode, RenderMode::DiffOverwrite);
        assert_eq!(request.instructions.as_deref(), Some("Keep it short"));
    }

    #[test]
    fn detection_response_serializes_null_for_no_detection() {
        let response = DetectionResponse {
            text: "no dates here".to_string(),
            raw: "not json".to_string(),
            detection: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["detection"].is_null());
    }
}
