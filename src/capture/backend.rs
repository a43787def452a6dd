use serde::{Deserialize, Serialize};

use super::resolution::ResolutionDimensions;
use crate::error::SessionResult;

/// Parameters for one capture run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub device_index: u32,
    pub resolution: ResolutionDimensions,
    pub frame_rate: u32,
}

/// Capture backend trait
///
/// Implementations:
/// - `FfmpegCapture`: external ffmpeg process writing fragmented MP4 to a pipe
/// - in-memory backends in tests
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing
    ///
    /// Fails if the capture process cannot be started; nothing keeps running
    /// in that case.
    async fn begin(&mut self, request: &CaptureRequest) -> SessionResult<()>;

    /// Force capture to end and return the bytes accumulated so far
    ///
    /// Returns an empty artifact when nothing was captured or nothing is running.
    async fn terminate(&mut self) -> SessionResult<Vec<u8>>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
