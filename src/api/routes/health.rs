//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::{AppState, DataSource};

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe. The ledger is loaded before the server binds,
/// so a running server can always answer chart requests.
pub async fn readiness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
///
/// Full health status. Serving demo data or an empty ledger is reported
/// as degraded.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let degraded = state.data_source == DataSource::Sample || state.ledger.is_empty();

    Json(HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        data_source: state.data_source.as_str().to_string(),
        transactions: state.ledger.len(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
