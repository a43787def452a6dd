pub mod capture;
pub mod config;
pub mod error;
pub mod http;
pub mod nats;
pub mod pointer;
pub mod session;
pub mod zoom;

pub use capture::{
    CaptureBackend, CaptureDevice, CaptureRequest, FfmpegCapture, ResolutionDimensions,
};
pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use http::{create_router, AppState};
pub use nats::{LifecycleMessage, NatsNotifier};
pub use pointer::{PointerDevice, PointerListener, ScriptedPointer};
pub use session::{
    ChannelNotifier, FixedDestination, NotificationSink, RecordingSession, SaveDestination,
    SessionConfig, SessionEvent, SessionState, SessionStatus,
};
pub use zoom::{synthesize, FilterExpression, PostProcessRenderer, ZoomPoint, ZoomWindow};
