//! Recording session management
//!
//! This module provides the `RecordingSession` controller that manages:
//! - The Idle/Preparing/Recording/Stopping state machine
//! - The capture backend lifecycle on a background task
//! - Pointer listening and zoom point collection
//! - Saving, with the zoom effect applied when points were recorded
//! - Lifecycle notifications

mod config;
mod notify;
mod save;
mod session;
mod state;

pub use config::SessionConfig;
pub use notify::{ChannelNotifier, LogNotifier, NotificationSink, SessionEvent};
pub use save::{default_file_name, CancelledDestination, FixedDestination, SaveDestination};
pub use session::RecordingSession;
pub use state::{SessionState, SessionStatus};
