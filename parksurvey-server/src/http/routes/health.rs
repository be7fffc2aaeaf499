//! Liveness and pool status

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    pub size: u32,
    pub checked_out: u32,
    pub max_connections: u32,
    pub closed: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub park: String,
    pub pool: PoolStatus,
}

/// GET /health
///
/// 503 once the pool has been closed for shutdown.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let pool = state.pool();
    let closed = pool.is_closed();
    let (code, status) = if closed {
        (StatusCode::SERVICE_UNAVAILABLE, "closing")
    } else {
        (StatusCode::OK, "ok")
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        park: state.reference().to_string(),
        pool: PoolStatus {
            size: pool.size(),
            checked_out: pool.checked_out(),
            max_connections: pool.max_connections(),
            closed,
        },
    };
    (code, Json(body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
