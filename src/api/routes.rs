//! REST endpoints for the recording service.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::SessionError;
use crate::session::RecorderService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecorderService>,
}

/// Build the Axum router. CORS is wide open — browser clients on other
/// origins stream chunks straight at this service.
pub fn recorder_routes(service: Arc<RecorderService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/api/start-recording", post(start_recording))
        .route("/api/add-audio-chunk", post(add_audio_chunk))
        .route("/api/stop-recording", post(stop_recording))
        .route("/api/get-summary", get(get_summary))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "transcription_backend": state.service.transcription_backend(),
    }))
}

// ── Recording lifecycle ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct StartRequest {
    room_id: Option<String>,
    #[serde(default = "default_username")]
    username: String,
}

fn default_username() -> String {
    "Anonymous".into()
}

async fn start_recording(
    State(state): State<AppState>,
    Json(body): Json<StartRequest>,
) -> impl IntoResponse {
    let Some(room_id) = body.room_id.filter(|r| !r.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Room ID is required"})),
        );
    };

    let recording = state.service.start(room_id, body.username).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "recording_id": recording.id,
            "status": "recording_started",
            "start_time": recording.started_at,
        })),
    )
}

#[derive(Deserialize)]
struct AddChunkRequest {
    recording_id: Option<Uuid>,
    audio_data: Option<String>,
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "wav".into()
}

async fn add_audio_chunk(
    State(state): State<AppState>,
    Json(body): Json<AddChunkRequest>,
) -> impl IntoResponse {
    let Some(recording_id) = body.recording_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid recording ID"})),
        );
    };
    let Some(audio_data) = body.audio_data.filter(|d| !d.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "No audio data provided"})),
        );
    };

    match state.service.feed(recording_id, audio_data, body.format).await {
        Ok(chunks_received) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "chunks_received": chunks_received,
            })),
        ),
        Err(e) => caller_error(recording_id, e),
    }
}

#[derive(Deserialize)]
struct StopRequest {
    recording_id: Option<Uuid>,
}

async fn stop_recording(
    State(state): State<AppState>,
    Json(body): Json<StopRequest>,
) -> impl IntoResponse {
    let Some(recording_id) = body.recording_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid recording ID"})),
        );
    };

    match state.service.stop(recording_id).await {
        Ok(()) => {
            info!(recording_id = %recording_id, "Stop accepted");
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "recording_id": recording_id,
                    "status": "processing",
                    "message": "Recording stopped. Processing and generating summary...",
                })),
            )
        }
        Err(e) => caller_error(recording_id, e),
    }
}

#[derive(Deserialize)]
struct SummaryQuery {
    recording_id: Option<Uuid>,
}

async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let Some(recording_id) = query.recording_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Recording ID is required"})),
        );
    };

    match state.service.poll(recording_id).await {
        Ok(response) => (StatusCode::OK, Json(serde_json::json!(response))),
        Err(e) => caller_error(recording_id, e),
    }
}

/// Map caller errors onto the wire. Callers only ever see 400s here; the
/// job's own state is never touched by a rejected request.
fn caller_error(
    recording_id: Uuid,
    error: SessionError,
) -> (StatusCode, Json<serde_json::Value>) {
    warn!(recording_id = %recording_id, error = %error, "Rejected request");
    let message = match &error {
        SessionError::NotFound { .. } => "Invalid recording ID".to_string(),
        SessionError::NotIngesting { .. } => "Recording session is not active".to_string(),
        other => other.to_string(),
    };
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": message})),
    )
}
