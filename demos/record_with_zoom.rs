// Record Example: screen capture with a click-driven zoom
//
// This example runs one complete session:
// 1. ffmpeg captures the selected screen as fragmented MP4 on stdout
// 2. Clicks during the recording become zoom points
// 3. On stop the capture is killed and the drained bytes are kept
// 4. Saving renders a zoom around the first click (or copies the raw bytes)
//
// IMPORTANT: Requires macOS permissions:
// - System Settings → Privacy & Security → Screen Recording → Add Terminal/IDE
// - System Settings → Privacy & Security → Accessibility → Add Terminal/IDE
//
// Usage:
//   cargo run --example record_with_zoom -- <seconds> <output.mp4>

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;
use zoomreel::capture::enumerate_devices;
use zoomreel::config::CaptureConfig;
use zoomreel::pointer::system_pointer;
use zoomreel::{
    ChannelNotifier, FfmpegCapture, FixedDestination, RecordingSession, SessionConfig,
    SessionEvent, SessionState,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let seconds = args.next().map(|s| s.parse::<u64>()).transpose()?.unwrap_or(5);
    let output = args.next().unwrap_or_else(|| "zoomed.mp4".to_string());

    let capture = CaptureConfig::default();

    // 1. Pick the first screen
    let devices = enumerate_devices(&capture.program, &capture.input_format).await?;
    let Some(device) = devices.first() else {
        bail!("No capture screens found");
    };
    info!("🖥️  Using [{}] {}", device.index, device.name);

    // 2. Build the session
    let (notifier, mut events) = ChannelNotifier::new();
    let session = RecordingSession::new(
        SessionConfig {
            device_index: device.index,
            ..SessionConfig::default()
        },
        Box::new(FfmpegCapture::new(capture)),
        system_pointer(),
        Arc::new(notifier),
    );

    let event_handle = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match &event {
                SessionEvent::Complete(bytes) => info!("📦 complete ({} bytes)", bytes.len()),
                other => info!("🔔 {}", other.name()),
            }
        }
    });

    // 3. Record
    session.start()?;
    while session.state() == SessionState::Preparing {
        sleep(Duration::from_millis(10)).await;
    }
    info!("🔴 Recording for {}s, click somewhere to zoom", seconds);
    sleep(Duration::from_secs(seconds)).await;

    if session.is_recording() {
        session.stop()?;
    }
    session.wait_for_completion().await;

    // 4. Save
    for (i, point) in session.zoom_points().iter().enumerate() {
        info!("🎯 Zoom point {}: ({}, {}) at {}", i, point.x, point.y, point.timestamp);
    }
    info!("🔍 Filter: {}", session.zoom_filter());

    let saved = session.save(&FixedDestination::new(output)).await?;
    info!("✅ Saved {}", saved.display());

    drop(session);
    event_handle.abort();

    Ok(())
}
