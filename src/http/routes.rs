use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/recording/start", post(handlers::start_recording))
        .route("/recording/stop", post(handlers::stop_recording))
        .route("/recording/save", post(handlers::save_recording))
        // Settings
        .route("/recording/resolution", put(handlers::set_resolution))
        .route("/recording/device", put(handlers::set_device))
        .route("/recording/preview", put(handlers::set_preview))
        // Queries
        .route("/recording/status", get(handlers::get_status))
        .route("/recording/zoom-points", get(handlers::get_zoom_points))
        .route("/resolutions", get(handlers::list_resolutions))
        .route("/devices", get(handlers::list_devices))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
