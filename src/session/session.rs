use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::notify::{NotificationSink, SessionEvent};
use super::save::{default_file_name, SaveDestination};
use super::state::{SessionState, SessionStatus};
use crate::capture::{CaptureBackend, CaptureRequest, ResolutionDimensions};
use crate::error::{SessionError, SessionResult};
use crate::pointer::{ClickSample, ClickSink, PointerDevice, PointerListener};
use crate::zoom::{synthesize_with, FilterExpression, PostProcessRenderer, ZoomPoint, ZoomPointStore};

/// State, start time and stop signal; changed together
struct RecordingGroup {
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    started_instant: Option<Instant>,
    stop_tx: Option<oneshot::Sender<()>>,
}

/// Capture parameters; only changed while idle
struct SelectionGroup {
    device_index: u32,
    resolution: ResolutionDimensions,
}

/// Session fields shared with background tasks
///
/// Each group has its own lock. When two are held at once the recording
/// group is always taken first.
struct SessionShared {
    session_id: String,
    recording: Mutex<RecordingGroup>,
    preview: AtomicBool,
    selection: Mutex<SelectionGroup>,
    zoom_points: ZoomPointStore,
    last_artifact: Mutex<Option<Arc<Vec<u8>>>>,
    notifier: Arc<dyn NotificationSink>,
}

impl SessionShared {
    fn state(&self) -> SessionState {
        self.recording.lock().state
    }

    fn set_idle(&self) {
        let mut recording = self.recording.lock();
        recording.state = SessionState::Idle;
        recording.stop_tx = None;
    }
}

impl ClickSink for SessionShared {
    fn is_listening(&self) -> bool {
        self.state() == SessionState::Recording || self.preview.load(Ordering::SeqCst)
    }

    fn on_click(&self, click: ClickSample) {
        let recording = self.recording.lock();
        if recording.state != SessionState::Recording {
            debug!("Click at ({}, {}) outside recording ignored", click.x, click.y);
            return;
        }

        let (Some(started_at), Some(started_instant)) =
            (recording.started_at, recording.started_instant)
        else {
            return;
        };

        let elapsed = started_instant.elapsed();
        let offset = chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());

        // Appending under the recording lock keeps every point inside
        // [start, stop] even if stop races with this click.
        self.zoom_points.append(ZoomPoint {
            x: click.x,
            y: click.y,
            timestamp: started_at + offset,
        });
        drop(recording);

        info!(
            "Zoom point recorded at position: X={}, Y={}, relative time {:.2}s",
            click.x,
            click.y,
            elapsed.as_secs_f64()
        );
    }
}

/// The recording session controller
///
/// Owns the session state machine and drives the capture backend, the
/// pointer listener and post-processing. `start` and `stop` return as soon
/// as the state has changed; capture runs on a background task.
pub struct RecordingSession {
    config: SessionConfig,
    shared: Arc<SessionShared>,
    backend: Arc<tokio::sync::Mutex<Box<dyn CaptureBackend>>>,
    listener: Arc<PointerListener>,
    renderer: PostProcessRenderer,
    run_handle: Mutex<Option<JoinHandle<()>>>,
}

impl RecordingSession {
    pub fn new(
        config: SessionConfig,
        backend: Box<dyn CaptureBackend>,
        pointer: Arc<dyn PointerDevice>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        info!(
            "Creating recording session: {} (capture backend: {})",
            config.session_id,
            backend.name()
        );

        let shared = Arc::new(SessionShared {
            session_id: config.session_id.clone(),
            recording: Mutex::new(RecordingGroup {
                state: SessionState::Idle,
                started_at: None,
                started_instant: None,
                stop_tx: None,
            }),
            preview: AtomicBool::new(false),
            selection: Mutex::new(SelectionGroup {
                device_index: config.device_index,
                resolution: config.resolution,
            }),
            zoom_points: ZoomPointStore::new(),
            last_artifact: Mutex::new(None),
            notifier,
        });

        let renderer = PostProcessRenderer::new(
            config.post_process_program.clone(),
            config.scratch_dir.clone(),
        );

        Self {
            config,
            shared,
            backend: Arc::new(tokio::sync::Mutex::new(backend)),
            listener: Arc::new(PointerListener::new(pointer)),
            renderer,
            run_handle: Mutex::new(None),
        }
    }

    /// Start a new recording
    ///
    /// Clears the previous session's zoom points and artifact, emits
    /// "preparing" and returns. Capture begins after the grace delay.
    pub fn start(&self) -> SessionResult<()> {
        let (stop_rx, request) = {
            let mut recording = self.shared.recording.lock();
            if recording.state != SessionState::Idle {
                return Err(SessionError::InvalidState(format!(
                    "cannot start while {}",
                    recording.state
                )));
            }

            recording.state = SessionState::Preparing;
            recording.started_at = None;
            recording.started_instant = None;
            self.shared.zoom_points.clear();

            let (stop_tx, stop_rx) = oneshot::channel();
            recording.stop_tx = Some(stop_tx);

            let selection = self.shared.selection.lock();
            let request = CaptureRequest {
                device_index: selection.device_index,
                resolution: selection.resolution,
                frame_rate: self.config.frame_rate,
            };

            (stop_rx, request)
        };

        *self.shared.last_artifact.lock() = None;

        info!("Starting recording session: {}", self.shared.session_id);
        self.shared.notifier.emit(SessionEvent::Preparing);

        let run = run_capture(
            Arc::clone(&self.shared),
            Arc::clone(&self.backend),
            Arc::clone(&self.listener),
            self.config.clone(),
            request,
            stop_rx,
        );

        // The previous run may still be returning after going idle; the new
        // one waits for it so `wait_for_completion` covers both.
        let mut run_handle = self.run_handle.lock();
        let previous = run_handle.take();
        *run_handle = Some(tokio::spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    error!("Previous capture task panicked: {}", e);
                }
            }
            run.await;
        }));

        Ok(())
    }

    /// Signal the capture to end
    ///
    /// Does not wait for the capture process; use `wait_for_completion` for that.
    pub fn stop(&self) -> SessionResult<()> {
        let stop_tx = {
            let mut recording = self.shared.recording.lock();
            if recording.state != SessionState::Recording {
                return Err(SessionError::InvalidState(format!(
                    "no recording in progress (session is {})",
                    recording.state
                )));
            }

            recording.state = SessionState::Stopping;
            recording.stop_tx.take()
        };

        info!("Stopping recording session: {}", self.shared.session_id);

        // Emitted before signalling so "stopped" always precedes "complete".
        self.shared.notifier.emit(SessionEvent::Stopped);

        if let Some(stop_tx) = stop_tx {
            // The run task only goes away after it has consumed the signal.
            let _ = stop_tx.send(());
        }

        Ok(())
    }

    /// Wait for the current capture run (if any) to finish
    pub async fn wait_for_completion(&self) {
        let handle = self.run_handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Capture task panicked: {}", e);
            }
        }
    }

    pub fn set_resolution(&self, id: &str) -> SessionResult<()> {
        let resolution = ResolutionDimensions::parse(id)?;

        let recording = self.shared.recording.lock();
        if recording.state != SessionState::Idle {
            return Err(SessionError::InvalidState(
                "cannot change resolution while recording".to_string(),
            ));
        }

        self.shared.selection.lock().resolution = resolution;
        drop(recording);

        info!("Resolution set to {}", resolution);
        Ok(())
    }

    pub fn set_selected_device(&self, index: u32) -> SessionResult<()> {
        let recording = self.shared.recording.lock();
        if recording.state != SessionState::Idle {
            return Err(SessionError::InvalidState(
                "cannot change device while recording".to_string(),
            ));
        }

        self.shared.selection.lock().device_index = index;
        drop(recording);

        info!("Selected capture device {}", index);
        Ok(())
    }

    /// Keep the pointer listener running outside of a recording
    ///
    /// Clicks during preview are drained but never stored.
    pub fn set_preview(&self, enabled: bool) {
        self.shared.preview.store(enabled, Ordering::SeqCst);

        if enabled {
            self.listener
                .start(Arc::clone(&self.shared) as Arc<dyn ClickSink>);
        }
    }

    pub fn is_previewing(&self) -> bool {
        self.shared.preview.load(Ordering::SeqCst)
    }

    pub fn is_recording(&self) -> bool {
        self.shared.state() == SessionState::Recording
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn resolution(&self) -> ResolutionDimensions {
        self.shared.selection.lock().resolution
    }

    pub fn selected_device(&self) -> u32 {
        self.shared.selection.lock().device_index
    }

    /// Copy of the zoom points recorded so far
    pub fn zoom_points(&self) -> Vec<ZoomPoint> {
        self.shared.zoom_points.snapshot()
    }

    /// When capture began for the current or last session
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.shared.recording.lock().started_at
    }

    /// The last completed capture artifact
    pub fn last_artifact(&self) -> Option<Arc<Vec<u8>>> {
        self.shared.last_artifact.lock().clone()
    }

    pub fn pointer_listener_running(&self) -> bool {
        self.listener.is_running()
    }

    pub fn status(&self) -> SessionStatus {
        let (state, started_at, duration_secs) = {
            let recording = self.shared.recording.lock();
            let duration = match (recording.state, recording.started_instant) {
                (SessionState::Recording, Some(instant)) => Some(instant.elapsed().as_secs_f64()),
                _ => None,
            };
            (recording.state, recording.started_at, duration)
        };

        SessionStatus {
            session_id: self.shared.session_id.clone(),
            state,
            is_recording: state == SessionState::Recording,
            is_previewing: self.is_previewing(),
            started_at,
            duration_secs,
            resolution: self.resolution(),
            device_index: self.selected_device(),
            zoom_points_count: self.shared.zoom_points.len(),
            last_artifact_bytes: self.shared.last_artifact.lock().as_ref().map(|a| a.len()),
        }
    }

    /// Zoom filter for the recorded points (identity when there are none)
    pub fn zoom_filter(&self) -> FilterExpression {
        let points = self.zoom_points();
        match self.started_at() {
            Some(started_at) => synthesize_with(
                &points,
                started_at,
                self.resolution(),
                self.config.frame_rate,
                &self.config.zoom,
            ),
            None => FilterExpression::identity(),
        }
    }

    /// Save the last completed capture
    pub async fn save(&self, destination: &dyn SaveDestination) -> SessionResult<PathBuf> {
        let artifact = self.last_artifact().ok_or_else(|| {
            SessionError::InvalidState("no completed recording to save".to_string())
        })?;

        self.save_bytes(&artifact, destination).await
    }

    /// Save `data`, applying the zoom effect when zoom points were recorded
    pub async fn save_bytes(
        &self,
        data: &[u8],
        destination: &dyn SaveDestination,
    ) -> SessionResult<PathBuf> {
        let chosen = destination
            .choose(&default_file_name())
            .ok_or_else(|| SessionError::Cancelled("save cancelled".to_string()))?;

        let points = self.zoom_points();
        if points.is_empty() {
            write_artifact(&chosen, data).await?;
            info!("Recording saved to {}", chosen.display());
            return Ok(chosen);
        }

        info!("Applying zoom effects to {} points", points.len());

        let filter = self.zoom_filter();
        let output = self.config.zoom_output_path.clone().unwrap_or(chosen);
        self.renderer.apply(data, &filter, &output).await
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        // Let a running capture task terminate its process instead of waiting forever.
        if let Some(stop_tx) = self.shared.recording.lock().stop_tx.take() {
            let _ = stop_tx.send(());
        }
        self.shared.preview.store(false, Ordering::SeqCst);
    }
}

async fn write_artifact(path: &std::path::Path, data: &[u8]) -> SessionResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, data).await?;
    Ok(())
}

/// One capture run: grace delay, spawn, record until stopped, finalize
async fn run_capture(
    shared: Arc<SessionShared>,
    backend: Arc<tokio::sync::Mutex<Box<dyn CaptureBackend>>>,
    listener: Arc<PointerListener>,
    config: SessionConfig,
    request: CaptureRequest,
    stop_rx: oneshot::Receiver<()>,
) {
    tokio::time::sleep(config.grace_delay).await;

    info!(
        "Capture device: {}, resolution: {}, {}fps",
        request.device_index, request.resolution, request.frame_rate
    );

    let begin = backend.lock().await.begin(&request).await;
    if let Err(e) = begin {
        error!("Failed to start capture: {}", e);
        shared.notifier.emit(SessionEvent::Stopped);
        shared.set_idle();
        return;
    }

    {
        let mut recording = shared.recording.lock();
        recording.state = SessionState::Recording;
        recording.started_at = Some(Utc::now());
        recording.started_instant = Some(Instant::now());
    }

    shared.notifier.emit(SessionEvent::Started);
    listener.start(Arc::clone(&shared) as Arc<dyn ClickSink>);

    if stop_rx.await.is_err() {
        warn!("Stop signal dropped; terminating capture");
    }

    let artifact = backend.lock().await.terminate().await;

    match artifact {
        Ok(bytes) => {
            if let Some(path) = &config.raw_output_path {
                match write_artifact(path, &bytes).await {
                    Ok(()) => info!("Raw recording written to {}", path.display()),
                    Err(e) => error!("Unable to save raw recording to {}: {}", path.display(), e),
                }
            }

            let bytes = Arc::new(bytes);
            *shared.last_artifact.lock() = Some(Arc::clone(&bytes));

            info!("Recording session complete: {} ({} bytes)", shared.session_id, bytes.len());
            // Still Stopping here, so no new session can emit ahead of this.
            shared.notifier.emit(SessionEvent::Complete(bytes));
            shared.set_idle();
        }
        Err(e) => {
            error!("Failed to finalize capture: {}", e);
            shared.set_idle();
        }
    }
}
