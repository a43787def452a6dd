pub mod backend;
pub mod devices;
pub mod ffmpeg;
pub mod pipeline;
pub mod resolution;

pub use backend::{CaptureBackend, CaptureRequest};
pub use devices::{enumerate_devices, parse_device_list, CaptureDevice};
pub use ffmpeg::{build_capture_args, FfmpegCapture};
pub use pipeline::{CaptureCommand, CaptureProcess, DRAIN_CHUNK_SIZE};
pub use resolution::{available_resolutions, ResolutionDimensions, AVAILABLE_RESOLUTIONS};
