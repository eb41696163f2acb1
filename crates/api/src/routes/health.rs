use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the upload root exists and is a directory.
    pub uploads_ready: bool,
}

/// GET /health -- returns service, database and upload storage health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = catalog_db::health_check(&state.pool).await.is_ok();
    let uploads_ready = tokio::fs::metadata(state.images.root())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let status = if db_healthy && uploads_ready {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        uploads_ready,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/admin`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
