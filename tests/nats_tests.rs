use std::sync::Arc;
use zoomreel::nats::{event_subject, LifecycleMessage};
use zoomreel::SessionEvent;

#[test]
fn test_lifecycle_message_without_payload() {
    let msg = LifecycleMessage::from_event("test-session", &SessionEvent::Started);

    let json = serde_json::to_string(&msg).unwrap();
    assert!(json.contains("test-session"));
    assert!(json.contains("\"event\":\"started\""));
    assert!(json.contains("\"payload\":null"));
    assert!(json.contains("\"payload_bytes\":0"));

    let deserialized: LifecycleMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.session_id, "test-session");
    assert_eq!(deserialized.event, "started");
    assert!(deserialized.decode_payload().is_none());
}

#[test]
fn test_complete_message_carries_artifact() {
    let artifact = Arc::new(b"ftypisom-fragment".to_vec());
    let msg = LifecycleMessage::from_event("test-session", &SessionEvent::Complete(artifact.clone()));

    assert_eq!(msg.event, "complete");
    assert_eq!(msg.payload_bytes, artifact.len());

    let json = serde_json::to_string(&msg).unwrap();
    let deserialized: LifecycleMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.decode_payload().unwrap(), *artifact);
}

#[test]
fn test_timestamp_is_rfc3339() {
    let msg = LifecycleMessage::from_event("test-session", &SessionEvent::Preparing);
    assert!(chrono::DateTime::parse_from_rfc3339(&msg.timestamp).is_ok());
}

#[test]
fn test_event_subjects() {
    assert_eq!(event_subject("recording", &SessionEvent::Preparing), "recording.preparing");
    assert_eq!(event_subject("recording", &SessionEvent::Stopped), "recording.stopped");
    assert_eq!(
        event_subject("studio.recorder", &SessionEvent::Complete(Arc::new(Vec::new()))),
        "studio.recorder.complete"
    );
}

#[test]
fn test_lifecycle_deserialization() {
    let json = r#"{
        "session_id": "session-1",
        "event": "stopped",
        "timestamp": "2025-10-27T14:30:05Z",
        "payload": null,
        "payload_bytes": 0
    }"#;

    let msg: LifecycleMessage = serde_json::from_str(json).unwrap();
    assert_eq!(msg.session_id, "session-1");
    assert_eq!(msg.event, "stopped");
    assert_eq!(msg.payload_bytes, 0);
}
