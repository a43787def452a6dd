use super::state::AppState;
use crate::capture::{available_resolutions, enumerate_devices, ResolutionDimensions};
use crate::error::SessionError;
use crate::session::{CancelledDestination, FixedDestination, SaveDestination, SessionState};
use crate::zoom::ZoomPoint;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SetResolutionRequest {
    /// e.g. "1920x1080"
    pub resolution: String,
}

#[derive(Debug, Deserialize)]
pub struct SetDeviceRequest {
    pub index: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetPreviewRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SaveRecordingRequest {
    /// Destination relative to the recordings directory; omitted means the
    /// save was cancelled
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub session_id: String,
    pub state: SessionState,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResolutionResponse {
    pub resolution: ResolutionDimensions,
}

#[derive(Debug, Serialize)]
pub struct SaveRecordingResponse {
    pub path: String,
    pub zoom_points: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: SessionError) -> Response {
    let status = match &err {
        SessionError::Configuration(_) | SessionError::Cancelled(_) => StatusCode::BAD_REQUEST,
        SessionError::InvalidState(_) => StatusCode::CONFLICT,
        SessionError::Process(_) | SessionError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Resolve a client-supplied save path inside `root`
///
/// Only plain relative paths are accepted; absolute paths and `..` would let
/// a client write anywhere the server can.
pub fn resolve_save_path(root: &Path, requested: &str) -> Result<PathBuf, SessionError> {
    let requested = Path::new(requested);
    let plain = requested
        .components()
        .all(|component| matches!(component, Component::Normal(_)));

    if requested.as_os_str().is_empty() || !plain {
        return Err(SessionError::Configuration(format!(
            "save path must be relative to the recordings directory: {}",
            requested.display()
        )));
    }

    Ok(root.join(requested))
}

fn state_response(state: &AppState, message: &str) -> Response {
    (
        StatusCode::OK,
        Json(StateResponse {
            session_id: state.session.status().session_id,
            state: state.session.state(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recording/start
pub async fn start_recording(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.start() {
        Ok(()) => state_response(&state, "Recording is starting"),
        Err(e) => error_response(e),
    }
}

/// POST /recording/stop
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.stop() {
        Ok(()) => state_response(&state, "Recording stopped"),
        Err(e) => error_response(e),
    }
}

/// GET /recording/status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.session.status()))
}

/// PUT /recording/resolution
pub async fn set_resolution(
    State(state): State<AppState>,
    Json(req): Json<SetResolutionRequest>,
) -> impl IntoResponse {
    match state.session.set_resolution(&req.resolution) {
        Ok(()) => (
            StatusCode::OK,
            Json(ResolutionResponse {
                resolution: state.session.resolution(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /recording/device
pub async fn set_device(
    State(state): State<AppState>,
    Json(req): Json<SetDeviceRequest>,
) -> impl IntoResponse {
    match state.session.set_selected_device(req.index) {
        Ok(()) => state_response(&state, &format!("Selected device {}", req.index)),
        Err(e) => error_response(e),
    }
}

/// PUT /recording/preview
pub async fn set_preview(
    State(state): State<AppState>,
    Json(req): Json<SetPreviewRequest>,
) -> impl IntoResponse {
    state.session.set_preview(req.enabled);
    let message = if req.enabled { "Preview enabled" } else { "Preview disabled" };
    state_response(&state, message)
}

/// GET /recording/zoom-points
pub async fn get_zoom_points(State(state): State<AppState>) -> impl IntoResponse {
    let points: Vec<ZoomPoint> = state.session.zoom_points();
    (StatusCode::OK, Json(points))
}

/// POST /recording/save
pub async fn save_recording(
    State(state): State<AppState>,
    Json(req): Json<SaveRecordingRequest>,
) -> impl IntoResponse {
    let destination: Box<dyn SaveDestination> = match req.path {
        Some(path) => match resolve_save_path(&state.recordings_dir, &path) {
            Ok(path) => Box::new(FixedDestination::new(path)),
            Err(e) => return error_response(e),
        },
        None => Box::new(CancelledDestination),
    };

    match state.session.save(destination.as_ref()).await {
        Ok(path) => {
            info!("Saved recording to {}", path.display());
            (
                StatusCode::OK,
                Json(SaveRecordingResponse {
                    path: path.display().to_string(),
                    zoom_points: state.session.zoom_points().len(),
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /resolutions
pub async fn list_resolutions() -> impl IntoResponse {
    (StatusCode::OK, Json(available_resolutions()))
}

/// GET /devices
pub async fn list_devices(State(state): State<AppState>) -> impl IntoResponse {
    match enumerate_devices(&state.capture.program, &state.capture.input_format).await {
        Ok(devices) => (StatusCode::OK, Json(devices)).into_response(),
        Err(e) => {
            error!("Failed to enumerate devices: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to enumerate devices: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
