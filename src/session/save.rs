use std::path::{Path, PathBuf};

/// Chooses where a finished recording is saved
pub trait SaveDestination: Send + Sync {
    /// Path to save to, or None if the user cancelled
    fn choose(&self, default_name: &str) -> Option<PathBuf>;
}

/// Always saves to the same place
///
/// A directory target gets the default file name appended.
#[derive(Debug, Clone)]
pub struct FixedDestination {
    path: PathBuf,
}

impl FixedDestination {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveDestination for FixedDestination {
    fn choose(&self, default_name: &str) -> Option<PathBuf> {
        if self.path.is_dir() {
            Some(self.path.join(default_name))
        } else {
            Some(self.path.clone())
        }
    }
}

/// A destination the user backed out of
#[derive(Debug, Default, Clone, Copy)]
pub struct CancelledDestination;

impl SaveDestination for CancelledDestination {
    fn choose(&self, _default_name: &str) -> Option<PathBuf> {
        None
    }
}

/// Default file name for a saved recording
pub fn default_file_name() -> String {
    format!("recording-{}.mp4", uuid::Uuid::new_v4())
}
