use axum::{extract::State, http::header, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use estoque_core::SanitizedConfig;

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub last_update: Option<DateTime<Utc>>,
    pub total_vehicles: usize,
}

/// GET /api/v1/health
///
/// Unhealthy until the first snapshot has loaded.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = state.store().status().await;
    let loaded = state.store().is_loaded().await;
    Json(HealthResponse {
        status: if loaded { "healthy" } else { "unhealthy" }.to_string(),
        last_update: status.last_update,
        total_vehicles: status.total_vehicles,
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
