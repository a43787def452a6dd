use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Lifecycle notification emitted by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Preparing,
    Started,
    Stopped,
    /// Capture finished; carries the raw artifact
    Complete(Arc<Vec<u8>>),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Preparing => "preparing",
            SessionEvent::Started => "started",
            SessionEvent::Stopped => "stopped",
            SessionEvent::Complete(_) => "complete",
        }
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            SessionEvent::Complete(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }
}

/// Destination for lifecycle notifications
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: SessionEvent);
}

/// Logs notifications and nothing else
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn emit(&self, event: SessionEvent) {
        match event.payload() {
            Some(bytes) => info!("Session event: {} ({} bytes)", event.name(), bytes.len()),
            None => info!("Session event: {}", event.name()),
        }
    }
}

/// Forwards notifications into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelNotifier {
    fn emit(&self, event: SessionEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}
