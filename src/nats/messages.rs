use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::session::SessionEvent;

/// Lifecycle notification published to NATS
#[derive(Debug, Serialize, Deserialize)]
pub struct LifecycleMessage {
    pub session_id: String,
    pub event: String,
    pub timestamp: String,  // RFC3339 timestamp
    pub payload: Option<String>,  // Base64-encoded capture artifact ("complete" only)
    pub payload_bytes: usize,
}

impl LifecycleMessage {
    pub fn from_event(session_id: &str, event: &SessionEvent) -> Self {
        let payload = event.payload();

        Self {
            session_id: session_id.to_string(),
            event: event.name().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            payload: payload.map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes)),
            payload_bytes: payload.map(|bytes| bytes.len()).unwrap_or(0),
        }
    }

    /// Decode the artifact carried by a "complete" message
    pub fn decode_payload(&self) -> Option<Vec<u8>> {
        self.payload
            .as_ref()
            .and_then(|p| base64::engine::general_purpose::STANDARD.decode(p).ok())
    }
}
