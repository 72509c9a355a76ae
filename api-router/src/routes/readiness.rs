use axum::{extract::State, http::StatusCode};

use crate::api_state::ApiState;

/// Ready once the process is serving; the index itself was bootstrapped at
/// startup via `ensure_index`.
pub async fn ready(State(_state): State<ApiState>) -> StatusCode {
    StatusCode::OK
}
