use thiserror::Error;

/// Errors surfaced by the recording session and its collaborators
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cancelled: {0}")]
    Cancelled(String),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
