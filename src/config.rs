use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub capture: CaptureConfig,
    #[serde(default)]
    pub zoom: ZoomConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub nats: NatsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Capture process settings
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// ffmpeg binary (name on PATH or absolute path)
    pub program: String,
    /// ffmpeg input device format, e.g. "avfoundation"
    pub input_format: String,
    pub frame_rate: u32,
    pub pixel_format: String,
    pub preset: String,
    pub crf: u32,
    /// `eq` filter applied while capturing
    pub color_filter: String,
    pub default_resolution: String,
    pub default_device: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            input_format: "avfoundation".to_string(),
            frame_rate: 60,
            pixel_format: "uyvy422".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            color_filter: "eq=brightness=0.019:saturation=1.15:gamma=0.8".to_string(),
            default_resolution: "1920x1080".to_string(),
            default_device: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoomConfig {
    pub duration_secs: f64,
    pub factor: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            duration_secs: 2.0,
            factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the raw capture is written to after every stop
    pub recordings_path: String,
    pub raw_filename: String,
    /// Directory for post-process scratch files
    pub scratch_dir: String,
    /// Fixed destination for zoomed renders; the chosen save path is used when unset
    pub zoom_output_path: Option<String>,
}

impl OutputConfig {
    pub fn recordings_dir(&self) -> PathBuf {
        expand(&self.recordings_path)
    }

    pub fn raw_output_path(&self) -> PathBuf {
        self.recordings_dir().join(&self.raw_filename)
    }

    pub fn scratch_path(&self) -> PathBuf {
        expand(&self.scratch_dir)
    }

    pub fn zoom_output(&self) -> Option<PathBuf> {
        self.zoom_output_path.as_deref().map(expand)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            recordings_path: ".".to_string(),
            raw_filename: "recorded.mp4".to_string(),
            scratch_dir: "./tmp".to_string(),
            zoom_output_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// Lifecycle notifications are only published when a URL is set
    pub url: Option<String>,
    pub subject_prefix: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: None,
            subject_prefix: "recording".to_string(),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("ZOOMREEL").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_defaults_match_reference_invocation() {
        let capture = CaptureConfig::default();
        assert_eq!(capture.frame_rate, 60);
        assert_eq!(capture.input_format, "avfoundation");
        assert!(capture.color_filter.starts_with("eq=brightness"));
    }

    #[test]
    fn test_output_paths() {
        let output = OutputConfig {
            recordings_path: "/tmp/rec".to_string(),
            raw_filename: "raw.mp4".to_string(),
            scratch_dir: "/tmp/scratch".to_string(),
            zoom_output_path: Some("/tmp/zoomed.mp4".to_string()),
        };

        assert_eq!(output.raw_output_path(), PathBuf::from("/tmp/rec/raw.mp4"));
        assert_eq!(output.scratch_path(), PathBuf::from("/tmp/scratch"));
        assert_eq!(output.zoom_output(), Some(PathBuf::from("/tmp/zoomed.mp4")));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("zoomreel.toml");
        std::fs::write(
            &path,
            r#"
[service]
name = "zoomreel"
[service.http]
bind = "127.0.0.1"
port = 8790

[capture]
program = "ffmpeg"
input_format = "avfoundation"
frame_rate = 30
pixel_format = "uyvy422"
preset = "fast"
crf = 20
color_filter = "eq=gamma=1.0"
default_resolution = "1280x720"
default_device = 1

[output]
recordings_path = "/tmp"
raw_filename = "recorded.mp4"
scratch_dir = "/tmp"
"#,
        )?;

        let cfg = Config::load(path.with_extension("").to_str().unwrap())?;
        assert_eq!(cfg.service.http.port, 8790);
        assert_eq!(cfg.capture.frame_rate, 30);
        assert_eq!(cfg.zoom.factor, 2.0);
        assert!(cfg.nats.url.is_none());
        assert!(cfg.output.zoom_output_path.is_none());
        Ok(())
    }
}
