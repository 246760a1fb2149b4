//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Chart responses use [`crate::charts::ChartPayload`] directly.

use serde::{Deserialize, Serialize};

// ============================================
// CHART DTOs
// ============================================

/// Query parameters of `GET /api/line`
#[derive(Debug, Default, Deserialize)]
pub struct LineChartParams {
    /// Month-ends to forecast, defaults to the configured horizon
    #[serde(default)]
    pub horizon: Option<usize>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy or degraded
    pub status: String,
    /// Ledger origin: sample or processed
    pub data_source: String,
    /// Number of transactions served
    pub transactions: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
