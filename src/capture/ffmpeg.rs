use tracing::info;

use super::backend::{CaptureBackend, CaptureRequest};
use super::pipeline::{CaptureCommand, CaptureProcess};
use crate::config::CaptureConfig;
use crate::error::{SessionError, SessionResult};

/// Build the ffmpeg invocation for a screen capture streamed to stdout
///
/// Output is fragmented MP4 with packets flushed as they are produced, so the
/// byte stream is playable up to the last complete fragment.
pub fn build_capture_args(config: &CaptureConfig, request: &CaptureRequest) -> Vec<String> {
    let frame_rate = request.frame_rate.to_string();

    vec![
        "-f".to_string(),
        config.input_format.clone(),
        "-capture_cursor".to_string(),
        "1".to_string(),
        "-framerate".to_string(),
        frame_rate.clone(),
        "-i".to_string(),
        format!("{}:none", request.device_index),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        config.preset.clone(),
        "-crf".to_string(),
        config.crf.to_string(),
        "-pix_fmt".to_string(),
        config.pixel_format.clone(),
        "-vf".to_string(),
        config.color_filter.clone(),
        "-f".to_string(),
        "mp4".to_string(),
        "-movflags".to_string(),
        "frag_keyframe+empty_moov+default_base_moof".to_string(),
        "-flush_packets".to_string(),
        "1".to_string(),
        "-r".to_string(),
        frame_rate,
        "pipe:1".to_string(),
    ]
}

/// Screen capture through an external ffmpeg process
pub struct FfmpegCapture {
    config: CaptureConfig,
    process: Option<CaptureProcess>,
}

impl FfmpegCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    pub fn command_for(&self, request: &CaptureRequest) -> CaptureCommand {
        CaptureCommand::new(
            self.config.program.clone(),
            build_capture_args(&self.config, request),
        )
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FfmpegCapture {
    async fn begin(&mut self, request: &CaptureRequest) -> SessionResult<()> {
        if self.process.is_some() {
            return Err(SessionError::InvalidState(
                "capture process already running".to_string(),
            ));
        }

        info!(
            "Starting ffmpeg capture (device={}, {}, {}fps)",
            request.device_index, request.resolution, request.frame_rate
        );

        let process = CaptureProcess::spawn(&self.command_for(request))?;
        self.process = Some(process);

        Ok(())
    }

    async fn terminate(&mut self) -> SessionResult<Vec<u8>> {
        match self.process.take() {
            Some(process) => process.terminate().await,
            None => Ok(Vec::new()),
        }
    }

    fn is_capturing(&self) -> bool {
        self.process.is_some()
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}
