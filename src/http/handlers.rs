use super::state::AppState;
use crate::session::Region;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    /// New region content (HTML for the body regions, plain text for the title)
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ActiveRegionRequest {
    pub region: Region,
}

#[derive(Debug, Deserialize)]
pub struct HistoryPanelRequest {
    pub open: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /note
/// Current view of the open note
pub async fn get_note(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.view().await)
}

/// POST /note/new
/// Commit the open note and start an empty one
pub async fn new_note(State(state): State<AppState>) -> impl IntoResponse {
    info!("New note requested");
    Json(state.session.new_note().await)
}

/// PUT /note/:region
/// Direct edit of the title, polished or elaborated region
pub async fn edit_region(
    State(state): State<AppState>,
    Path(region): Path<String>,
    Json(req): Json<EditRequest>,
) -> impl IntoResponse {
    match Region::parse(&region) {
        Some(region) => Json(state.session.edit(region, &req.content).await).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Unknown region {}", region),
        ),
    }
}

/// POST /note/active
/// Select the body region used by copy
pub async fn set_active_region(
    State(state): State<AppState>,
    Json(req): Json<ActiveRegionRequest>,
) -> impl IntoResponse {
    match state.session.set_active_region(req.region).await {
        Some(view) => Json(view).into_response(),
        None => error_response(
            StatusCode::BAD_REQUEST,
            "Only the polished or elaborated region can be active".to_string(),
        ),
    }
}

/// POST /note/copy
/// Copy the active region to the clipboard as plain text
pub async fn copy_active(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.copy_active().await)
}

/// POST /record/start
pub async fn start_recording(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.start_recording().await)
}

/// POST /record/stop
/// Stop recording; transcription continues in the background
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    if state.session.stop_recording().await.is_none() {
        warn!("Stop requested but no audio was handed off for processing");
    }
    Json(state.session.view().await)
}

/// POST /record/toggle
/// Record button: start when idle, stop when recording
pub async fn toggle_recording(State(state): State<AppState>) -> impl IntoResponse {
    state.session.toggle_recording().await;
    Json(state.session.view().await)
}

/// GET /record/feedback
/// Latest timer and visualizer frame
pub async fn get_feedback(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.feedback_frame().await)
}

/// GET /history
pub async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session.history_items().await)
}

/// POST /history/panel
pub async fn set_history_panel(
    State(state): State<AppState>,
    Json(req): Json<HistoryPanelRequest>,
) -> impl IntoResponse {
    Json(state.session.set_history_panel(req.open).await)
}

/// POST /history/:id/load
/// Commit the open note and open a history entry
pub async fn load_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.session.load_history_entry(&id).await {
        Some(view) => Json(view).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("History entry {} not found", id),
        ),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
