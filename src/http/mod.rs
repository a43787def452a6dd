//! HTTP API server for external control
//!
//! This module provides a REST API for the recording session:
//! - POST /recording/start - Start recording
//! - POST /recording/stop - Stop recording
//! - POST /recording/save - Save the last recording under the recordings directory
//!   (zoomed if clicks were recorded)
//! - PUT /recording/resolution, /recording/device, /recording/preview - Settings
//! - GET /recording/status - Query session status
//! - GET /recording/zoom-points - Recorded zoom points
//! - GET /resolutions, /devices - Capture options
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
