use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use crate::capture::ResolutionDimensions;
use crate::config::Config;
use crate::zoom::ZoomParams;

/// Configuration for a recording session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Identifier attached to lifecycle notifications
    pub session_id: String,

    /// Capture and output frame rate
    pub frame_rate: u32,

    /// Resolution used until `set_resolution` changes it
    pub resolution: ResolutionDimensions,

    /// Capture device used until `set_selected_device` changes it
    pub device_index: u32,

    /// Delay between "preparing" and spawning the capture process
    pub grace_delay: Duration,

    pub zoom: ZoomParams,

    /// Where the raw capture is written after every stop (skipped when None)
    pub raw_output_path: Option<PathBuf>,

    /// Fixed destination for zoomed renders; the chosen save path when None
    pub zoom_output_path: Option<PathBuf>,

    /// Program used for post-processing
    pub post_process_program: String,

    /// Directory for post-process scratch files
    pub scratch_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            frame_rate: 60,
            resolution: ResolutionDimensions::default(), // 1920x1080
            device_index: 0,
            grace_delay: Duration::from_millis(100),
            zoom: ZoomParams::default(),
            raw_output_path: Some(PathBuf::from("recorded.mp4")),
            zoom_output_path: None,
            post_process_program: "ffmpeg".to_string(),
            scratch_dir: PathBuf::from("./tmp"),
        }
    }
}

impl SessionConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolution = ResolutionDimensions::parse(&config.capture.default_resolution)?;

        Ok(Self {
            frame_rate: config.capture.frame_rate,
            resolution,
            device_index: config.capture.default_device,
            zoom: ZoomParams::from(&config.zoom),
            raw_output_path: Some(config.output.raw_output_path()),
            zoom_output_path: config.output.zoom_output(),
            post_process_program: config.capture.program.clone(),
            scratch_dir: config.output.scratch_path(),
            ..Self::default()
        })
    }
}
