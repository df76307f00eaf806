//! Shared server state and operational handlers

use crate::metrics::OperationMetrics;
use crate::service::SoireeService;
use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

/// Shared server state
pub struct ServerState {
    pub service: SoireeService,
    pub metrics: Arc<OperationMetrics>,
}

/// Shared state handed to every handler
pub type SoireeState = Arc<ServerState>;

// ============================================================================
// Health check
// ============================================================================

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub neo4j: String,
}

/// Health check handler, verifies connectivity to Neo4j.
///
/// Returns 200 + `"ok"` when connected, 503 + `"unhealthy"` otherwise.
pub async fn health(State(state): State<SoireeState>) -> (StatusCode, Json<HealthResponse>) {
    let neo4j_ok = state.service.health_check().await.unwrap_or(false);

    let (http_status, status, neo4j) = if neo4j_ok {
        (StatusCode::OK, "ok", "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "disconnected")
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            neo4j: neo4j.to_string(),
        }),
    )
}

// ============================================================================
// Metrics
// ============================================================================

/// Prometheus text exposition of the store operation counters
pub async fn metrics(State(state): State<SoireeState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.to_prometheus(),
    )
}
