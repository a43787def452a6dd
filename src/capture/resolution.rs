use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{SessionError, SessionResult};

pub const RESOLUTION_720P: &str = "1280x720";
pub const RESOLUTION_1080P: &str = "1920x1080";
pub const RESOLUTION_1440P: &str = "2560x1440";
pub const RESOLUTION_4K: &str = "3840x2160";

/// Resolutions the capture pipeline accepts
pub const AVAILABLE_RESOLUTIONS: [&str; 4] = [
    RESOLUTION_720P,
    RESOLUTION_1080P,
    RESOLUTION_1440P,
    RESOLUTION_4K,
];

/// Output frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolutionDimensions {
    pub width: u32,
    pub height: u32,
}

impl ResolutionDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a "WIDTHxHEIGHT" identifier from the recognized set
    pub fn parse(id: &str) -> SessionResult<Self> {
        if !AVAILABLE_RESOLUTIONS.contains(&id) {
            return Err(SessionError::Configuration(format!(
                "unrecognized resolution: {}",
                id
            )));
        }

        let (width, height) = id
            .split_once('x')
            .ok_or_else(|| SessionError::Configuration(format!("invalid resolution format: {}", id)))?;

        let width = width
            .parse::<u32>()
            .map_err(|_| SessionError::Configuration(format!("invalid width in resolution: {}", width)))?;
        let height = height
            .parse::<u32>()
            .map_err(|_| SessionError::Configuration(format!("invalid height in resolution: {}", height)))?;

        Ok(Self { width, height })
    }
}

impl Default for ResolutionDimensions {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl FromStr for ResolutionDimensions {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResolutionDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// List the recognized resolution identifiers
pub fn available_resolutions() -> Vec<String> {
    AVAILABLE_RESOLUTIONS.iter().map(|r| r.to_string()).collect()
}
