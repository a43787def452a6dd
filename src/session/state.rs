use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capture::ResolutionDimensions;

/// Lifecycle of the recording session
///
/// Transitions: Idle -> Preparing -> Recording -> Stopping -> Idle. A capture
/// process that fails to spawn takes Preparing straight back to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Preparing,
    Recording,
    Stopping,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Preparing => write!(f, "preparing"),
            SessionState::Recording => write!(f, "recording"),
            SessionState::Stopping => write!(f, "stopping"),
        }
    }
}

/// Point-in-time view of the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,

    pub state: SessionState,

    /// Whether recording is currently active
    pub is_recording: bool,

    /// Whether the pointer listener is kept alive for preview
    pub is_previewing: bool,

    /// When capture actually began, once it has
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since capture began, while recording
    pub duration_secs: Option<f64>,

    pub resolution: ResolutionDimensions,

    pub device_index: u32,

    /// Number of zoom points recorded so far
    pub zoom_points_count: usize,

    /// Size of the last completed capture artifact
    pub last_artifact_bytes: Option<usize>,
}
