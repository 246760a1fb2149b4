//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::charts::ChartOptions;
use crate::config::ServerConfig;
use crate::ledger::Ledger;

/// Where the served ledger came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Built-in demo transactions
    Sample,
    /// The processed transactions file
    Processed,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Sample => "sample",
            DataSource::Processed => "processed",
        }
    }
}

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Transactions the charts are built from
    pub ledger: Arc<Ledger>,
    /// Where `ledger` was loaded from
    pub data_source: DataSource,
    /// Figure building options
    pub chart_options: Arc<ChartOptions>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state serving the sample ledger with default chart options
    pub fn new(ledger: Ledger, config: ApiConfig) -> Self {
        Self {
            ledger: Arc::new(ledger),
            data_source: DataSource::Sample,
            chart_options: Arc::new(ChartOptions::default()),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Record where the ledger came from
    pub fn with_data_source(mut self, data_source: DataSource) -> Self {
        self.data_source = data_source;
        self
    }

    /// Use custom figure options
    pub fn with_chart_options(mut self, options: ChartOptions) -> Self {
        self.chart_options = Arc::new(options);
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins, any origin when empty
    pub cors_origins: Vec<String>,
    /// Largest accepted `horizon` for the line chart
    pub max_forecast_horizon: usize,
    /// Requests running longer than this are answered with 408
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
            cors_origins: Vec::new(),
            max_forecast_horizon: 36,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&ServerConfig> for ApiConfig {
    fn from(server: &ServerConfig) -> Self {
        Self {
            host: server.host.clone(),
            port: server.port,
            cors_origins: server.cors_origins.clone(),
            request_timeout: Duration::from_secs(server.request_timeout_secs),
            ..Default::default()
        }
    }
}
