use api_state::ApiState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use routes::{
    chat::chat, index::index_page, ingest::ingest_files, liveness::live, readiness::ready,
};

pub mod api_state;
pub mod error;
mod routes;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Router for API functionality, version 1
pub fn api_routes_v1() -> Router<ApiState> {
    Router::new()
        // Public probe endpoints (for k8s/systemd)
        .route("/ready", get(ready))
        .route("/live", get(live))
        .route("/chat", post(chat))
        .route(
            "/ingest",
            post(ingest_files).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

/// The full application router: the embedded UI at `/` plus the JSON API.
pub fn app_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .nest("/api/v1", api_routes_v1())
        .with_state(state)
}
