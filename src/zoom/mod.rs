//! Zoom points and the post-processing zoom effect

pub mod filter;
pub mod render;
pub mod store;

pub use filter::{synthesize, synthesize_with, FilterExpression, ZoomParams, ZoomWindow, IDENTITY_FILTER};
pub use render::PostProcessRenderer;
pub use store::{ZoomPoint, ZoomPointStore};
