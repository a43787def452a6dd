use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

use super::filter::FilterExpression;
use crate::error::{SessionError, SessionResult};

/// Runs the filter process over a captured artifact
#[derive(Debug, Clone)]
pub struct PostProcessRenderer {
    program: String,
    scratch_dir: PathBuf,
}

impl PostProcessRenderer {
    pub fn new(program: impl Into<String>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Render `data` through `filter` into `output`, overwriting it
    ///
    /// Video is filtered, audio is copied unchanged. The scratch copy of the
    /// input is removed whether or not the filter process succeeds.
    pub async fn apply(
        &self,
        data: &[u8],
        filter: &FilterExpression,
        output: &Path,
    ) -> SessionResult<PathBuf> {
        tokio::fs::create_dir_all(&self.scratch_dir).await?;

        let scratch = ScratchFile(
            self.scratch_dir
                .join(format!("temp_recording_{}.mp4", uuid::Uuid::new_v4())),
        );
        tokio::fs::write(&scratch.0, data).await?;

        info!("Applying filter: {}", filter);

        let status = Command::new(&self.program)
            .arg("-i")
            .arg(&scratch.0)
            .args(["-vf", filter.as_str(), "-c:a", "copy", "-y"])
            .arg(output)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                SessionError::Process(format!("failed to start {}: {}", self.program, e))
            })?;

        if !status.success() {
            return Err(SessionError::Process(format!(
                "filter process exited with {}",
                status
            )));
        }

        info!("Rendered zoomed recording to {}", output.display());

        Ok(output.to_path_buf())
    }
}

/// Scratch input removed on drop
struct ScratchFile(PathBuf);

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = remove_scratch(&self.0) {
            warn!("Failed to remove scratch file {}: {}", self.0.display(), e);
        }
    }
}

/// Remove a scratch file; one that was never written is not an error
fn remove_scratch(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_scratch_ignores_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(remove_scratch(&dir.path().join("never-written.mp4")).is_ok());
    }

    #[test]
    fn test_remove_scratch_deletes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("temp_recording.mp4");
        std::fs::write(&path, b"data").unwrap();

        remove_scratch(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_scratch_reports_other_errors() {
        // A directory cannot be removed as a file
        let dir = tempfile::TempDir::new().unwrap();
        assert!(remove_scratch(dir.path()).is_err());
    }
}
