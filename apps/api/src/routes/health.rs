//! Liveness and database health.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`: 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = state.db.health_check().await;

    let (status, body) = if healthy {
        (
            StatusCode::OK,
            HealthResponse {
                status: "ok",
                database: "connected",
                version: env!("CARGO_PKG_VERSION"),
            },
        )
    } else {
        tracing::warn!("Health check failed: database unavailable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "unavailable",
                database: "disconnected",
                version: env!("CARGO_PKG_VERSION"),
            },
        )
    };

    (status, Json(body))
}
