use anyhow::{Context, Result};
use async_nats::Client;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::messages::LifecycleMessage;
use crate::session::{NotificationSink, SessionEvent};

/// Publishes session lifecycle notifications to NATS
///
/// Events are queued and published by a single background task so they
/// arrive in the order the session emitted them.
pub struct NatsNotifier {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl NatsNotifier {
    /// Connect to NATS server
    pub async fn connect(url: &str, session_id: String, subject_prefix: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = publish_event(&client, &subject_prefix, &session_id, &event).await {
                    error!("Failed to publish {} notification: {}", event.name(), e);
                }
            }
            info!("NATS notifier stopped");
        });

        Ok(Self { tx })
    }
}

/// Subject for a lifecycle event, e.g. "recording.started"
pub fn event_subject(prefix: &str, event: &SessionEvent) -> String {
    format!("{}.{}", prefix, event.name())
}

async fn publish_event(
    client: &Client,
    prefix: &str,
    session_id: &str,
    event: &SessionEvent,
) -> Result<()> {
    let subject = event_subject(prefix, event);
    let message = LifecycleMessage::from_event(session_id, event);
    let payload = serde_json::to_vec(&message)?;

    client
        .publish(subject.clone(), payload.into())
        .await
        .context("Failed to publish lifecycle notification")?;

    info!(
        "Published {} to {} (payload bytes={})",
        message.event, subject, message.payload_bytes
    );

    Ok(())
}

impl NotificationSink for NatsNotifier {
    fn emit(&self, event: SessionEvent) {
        if self.tx.send(event).is_err() {
            error!("NATS notifier task is gone; notification dropped");
        }
    }
}
