//! Zoom filter synthesis
//!
//! Turns recorded zoom points into an ffmpeg `zoompan` filter graph. Only
//! the first point produces an effect; later points are kept by the store
//! but ignored here. The zoom factor follows a triangle over the frame
//! window: 1 at both edges, the configured factor at the midpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::store::ZoomPoint;
use crate::capture::ResolutionDimensions;
use crate::config::ZoomConfig;

/// Filter that passes frames through unchanged
pub const IDENTITY_FILTER: &str = "null";

/// Shape of the zoom effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomParams {
    /// Length of the zoom window in seconds
    pub duration_secs: f64,
    /// Peak zoom factor at the window midpoint
    pub factor: f64,
}

impl Default for ZoomParams {
    fn default() -> Self {
        Self {
            duration_secs: 2.0,
            factor: 2.0,
        }
    }
}

impl From<&ZoomConfig> for ZoomParams {
    fn from(config: &ZoomConfig) -> Self {
        Self {
            duration_secs: config.duration_secs,
            factor: config.factor,
        }
    }
}

/// An opaque filter-graph expression for the post-process step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpression(String);

impl FilterExpression {
    pub fn identity() -> Self {
        Self(IDENTITY_FILTER.to_string())
    }

    pub fn is_identity(&self) -> bool {
        self.0 == IDENTITY_FILTER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Frame window of a single zoom effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomWindow {
    pub start_frame: i64,
    pub end_frame: i64,
    pub peak_factor: f64,
    pub x: i32,
    pub y: i32,
}

impl ZoomWindow {
    pub fn new(
        point: &ZoomPoint,
        session_start: DateTime<Utc>,
        frame_rate: u32,
        params: &ZoomParams,
    ) -> Self {
        let fps = frame_rate as f64;
        let offset = point.timestamp.signed_duration_since(session_start);
        let offset_secs = offset.num_microseconds().unwrap_or(0) as f64 / 1_000_000.0;

        let start_frame = (offset_secs * fps).round() as i64;
        let end_frame = start_frame + (params.duration_secs * fps).round() as i64;

        Self {
            start_frame,
            end_frame,
            peak_factor: params.factor,
            x: point.x,
            y: point.y,
        }
    }

    pub fn len_frames(&self) -> i64 {
        self.end_frame - self.start_frame
    }

    /// Zoom factor at output frame `frame`; 1 outside the window
    pub fn factor_at(&self, frame: i64) -> f64 {
        let len = self.len_frames();
        if len <= 0 || frame < self.start_frame || frame > self.end_frame {
            return 1.0;
        }

        let progress = 2.0 * (frame - self.start_frame) as f64 / len as f64 - 1.0;
        1.0 + (self.peak_factor - 1.0) * (1.0 - progress.abs())
    }

    /// Top-left of the visible region that keeps the click centered
    pub fn pan_at(&self, frame: i64, frame_width: u32, frame_height: u32) -> (f64, f64) {
        let zoom = self.factor_at(frame);
        (
            self.x as f64 - frame_width as f64 / zoom / 2.0,
            self.y as f64 - frame_height as f64 / zoom / 2.0,
        )
    }

    /// The factor curve as an ffmpeg expression over the output frame number `on`
    fn zoom_expression(&self) -> String {
        format!(
            "if(between(on,{start},{end}), 1+({factor:.2}-1)*(1-abs(2*(on-{start})/{len}-1)), 1)",
            start = self.start_frame,
            end = self.end_frame,
            factor = self.peak_factor,
            len = self.len_frames().max(1),
        )
    }
}

/// Build the zoom filter with the default effect shape
pub fn synthesize(
    points: &[ZoomPoint],
    session_start: DateTime<Utc>,
    resolution: ResolutionDimensions,
    frame_rate: u32,
) -> FilterExpression {
    synthesize_with(points, session_start, resolution, frame_rate, &ZoomParams::default())
}

pub fn synthesize_with(
    points: &[ZoomPoint],
    session_start: DateTime<Utc>,
    resolution: ResolutionDimensions,
    frame_rate: u32,
    params: &ZoomParams,
) -> FilterExpression {
    let Some(point) = points.first() else {
        return FilterExpression::identity();
    };

    let window = ZoomWindow::new(point, session_start, frame_rate, params);
    let (width, height) = (resolution.width, resolution.height);

    FilterExpression(format!(
        "zoompan=z='{zoom}':x='{x}-(iw/zoom/2)':y='{y}-(ih/zoom/2)':d=1:s={width}x{height}:fps={frame_rate},\
         scale={width}:{height}:force_original_aspect_ratio=increase,crop={width}:{height}",
        zoom = window.zoom_expression(),
        x = window.x,
        y = window.y,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn point_at(ms: i64) -> ZoomPoint {
        ZoomPoint {
            x: 800,
            y: 450,
            timestamp: start() + Duration::milliseconds(ms),
        }
    }

    #[test]
    fn test_window_rounds_to_nearest_frame() {
        // 1.009s * 60 = 60.54
        let window = ZoomWindow::new(&point_at(1_009), start(), 60, &ZoomParams::default());
        assert_eq!(window.start_frame, 61);
        assert_eq!(window.end_frame, 181);
    }

    #[test]
    fn test_factor_is_triangular() {
        let window = ZoomWindow::new(&point_at(1_000), start(), 60, &ZoomParams::default());
        assert_eq!(window.factor_at(59), 1.0);
        assert_eq!(window.factor_at(60), 1.0);
        assert!((window.factor_at(90) - 1.5).abs() < 1e-9);
        assert!((window.factor_at(120) - 2.0).abs() < 1e-9);
        assert!((window.factor_at(150) - 1.5).abs() < 1e-9);
        assert_eq!(window.factor_at(180), 1.0);
        assert_eq!(window.factor_at(181), 1.0);
    }

    #[test]
    fn test_zero_length_window_never_zooms() {
        let params = ZoomParams {
            duration_secs: 0.0,
            factor: 2.0,
        };
        let window = ZoomWindow::new(&point_at(1_000), start(), 60, &params);
        assert_eq!(window.factor_at(60), 1.0);
        assert!(window.zoom_expression().contains("/1-1"));
    }

    #[test]
    fn test_custom_params_render_into_expression() {
        let params = ZoomParams {
            duration_secs: 1.0,
            factor: 3.0,
        };
        let filter = synthesize_with(
            &[point_at(500)],
            start(),
            ResolutionDimensions::new(1280, 720),
            30,
            &params,
        );
        assert!(filter.as_str().contains("between(on,15,45)"));
        assert!(filter.as_str().contains("1+(3.00-1)"));
        assert!(filter.as_str().contains(":fps=30,"));
    }
}
