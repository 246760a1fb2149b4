//! Dashboard error types

use thiserror::Error;

use crate::charts::ChartKind;

/// Why a chart did not appear in its mount point
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The request never produced a response
    #[error("Network error fetching {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// The request timed out
    #[error("Timed out fetching {endpoint}")]
    Timeout { endpoint: String },

    /// The backend answered with a non-success status
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The body was not a `{data, layout}` object
    #[error("Invalid chart payload from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// The renderer rejected the chart
    #[error("Failed to render {mount}: {message}")]
    Render { mount: String, message: String },

    /// The dashboard was torn down before the chart finished
    #[error("Loading {0} was cancelled")]
    Cancelled(ChartKind),

    /// The loading task panicked or was aborted
    #[error("Loading task for {0} failed")]
    TaskFailed(ChartKind),
}

impl DashboardError {
    pub fn render(mount: &str, err: impl std::fmt::Display) -> Self {
        DashboardError::Render {
            mount: mount.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DashboardError::Cancelled(_))
    }
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;
