use crate::config::CaptureConfig;
use crate::session::RecordingSession;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single recording session
    pub session: Arc<RecordingSession>,

    /// Capture tool settings (for device enumeration)
    pub capture: Arc<CaptureConfig>,

    /// Saves requested over HTTP land inside this directory
    pub recordings_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        session: Arc<RecordingSession>,
        capture: CaptureConfig,
        recordings_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            session,
            capture: Arc::new(capture),
            recordings_dir: Arc::new(recordings_dir.into()),
        }
    }
}
