use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

/// Readiness probe: 200 only when the repository answers a ping, 503
/// otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = match state.repo.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("readiness check failed: {e:#}");
            false
        }
    };

    let (status, db_status) = if db_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "error")
    };
    (
        status,
        Json(json!({
            "status": if db_ok { "ok" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "database": db_status
        })),
    )
}
