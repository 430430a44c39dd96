use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

pub fn build_routes(state: AppState) -> Router {
    let limit = state
        .solver
        .config()
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/process-text", post(handlers::process_text))
        .route("/api/upload", post(handlers::upload))
        .route("/api/status/:job_id", get(handlers::job_status))
        .layer(DefaultBodyLimit::max(limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
