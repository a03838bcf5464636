use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod compose;
mod download;
mod health;
mod upload;

pub use compose::{ComposeRequest, ComposeResponse};
pub use upload::UploadResponse;

/// Build the service router
pub fn router(state: Arc<AppState>) -> Router {
    // Multipart framing on top of the file itself
    let body_limit = state.config.limits.max_upload_bytes.saturating_add(64 * 1024);

    let api_routes = Router::new()
        .route(
            "/upload",
            post(upload::upload_handler).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/compose", post(compose::compose_handler))
        .route("/download/{filename}", get(download::download_handler));

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
