//! Subprocess pipeline for the capture tool
//!
//! The capture process writes its encoded output to stdout. A drain task
//! copies that pipe into an in-memory buffer in fixed-size chunks until the
//! pipe closes. Stopping is a hard kill: the fragmented container keeps
//! everything up to the last flushed fragment playable, so whatever was
//! drained before the kill is the artifact.

use parking_lot::Mutex;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{SessionError, SessionResult};

/// Bytes read from the pipe per iteration
pub const DRAIN_CHUNK_SIZE: usize = 4096;

/// How long `terminate` waits for the drain task after the process exits
const DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Program and arguments for a capture process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CaptureCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

/// A running capture process and its drain task
pub struct CaptureProcess {
    child: Child,
    buffer: Arc<Mutex<Vec<u8>>>,
    drain_handle: Option<JoinHandle<()>>,
}

impl CaptureProcess {
    /// Spawn the process with stdout piped and start draining it
    ///
    /// Spawn failures are returned here, before any background work starts.
    pub fn spawn(command: &CaptureCommand) -> SessionResult<Self> {
        info!("Spawning capture process: {} {:?}", command.program, command.args);

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SessionError::Process(format!("failed to start {}: {}", command.program, e))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SessionError::Process("capture process has no stdout pipe".to_string())
        })?;

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let drain_handle = tokio::spawn(drain(stdout, Arc::clone(&buffer)));

        Ok(Self {
            child,
            buffer,
            drain_handle: Some(drain_handle),
        })
    }

    /// Process id, if the process is still running
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Bytes drained so far
    pub fn bytes_captured(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Kill the process, wait for it to exit and return everything drained
    pub async fn terminate(mut self) -> SessionResult<Vec<u8>> {
        info!("Terminating capture process (pid={:?})", self.child.id());

        if let Err(e) = self.child.start_kill() {
            // Already exited on its own; wait() below still reaps it.
            warn!("Failed to kill capture process: {}", e);
        }

        match self.child.wait().await {
            Ok(status) => debug!("Capture process exited: {}", status),
            Err(e) => error!("Failed to wait for capture process: {}", e),
        }

        if let Some(handle) = self.drain_handle.take() {
            let abort = handle.abort_handle();
            match tokio::time::timeout(DRAIN_GRACE, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Drain task panicked: {}", e),
                Err(_) => {
                    warn!("Drain task did not finish within {:?}; aborting", DRAIN_GRACE);
                    abort.abort();
                }
            }
        }

        let artifact = std::mem::take(&mut *self.buffer.lock());
        info!("Capture artifact finalized ({} bytes)", artifact.len());

        Ok(artifact)
    }
}

/// Copy the pipe into `buffer` until end-of-stream or a read error
async fn drain(mut stdout: ChildStdout, buffer: Arc<Mutex<Vec<u8>>>) {
    let mut chunk = [0u8; DRAIN_CHUNK_SIZE];

    loop {
        match stdout.read(&mut chunk).await {
            Ok(0) => {
                debug!("Capture pipe closed");
                break;
            }
            Ok(n) => buffer.lock().extend_from_slice(&chunk[..n]),
            Err(e) => {
                debug!("Capture pipe read failed: {}", e);
                break;
            }
        }
    }
}
