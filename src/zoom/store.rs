use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A click position marking where a zoom should center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomPoint {
    /// Screen x coordinate in pixels
    pub x: i32,
    /// Screen y coordinate in pixels
    pub y: i32,
    /// When the click happened
    pub timestamp: DateTime<Utc>,
}

/// Arrival-ordered zoom points behind their own lock
#[derive(Debug, Default)]
pub struct ZoomPointStore {
    points: Mutex<Vec<ZoomPoint>>,
}

impl ZoomPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, point: ZoomPoint) {
        self.points.lock().push(point);
    }

    pub fn clear(&self) {
        self.points.lock().clear();
    }

    /// Independent copy of the points in arrival order
    pub fn snapshot(&self) -> Vec<ZoomPoint> {
        self.points.lock().clone()
    }

    pub fn first(&self) -> Option<ZoomPoint> {
        self.points.lock().first().copied()
    }

    pub fn len(&self) -> usize {
        self.points.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.lock().is_empty()
    }
}
