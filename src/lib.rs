//! # Finboard
//!
//! Personal financial dashboard: a chart API serving Plotly figures built
//! from categorised bank transactions, and the loader that mounts them.
//!
//! ## Features
//!
//! - **Preprocessing**: raw bank exports become one categorised transactions file
//! - **Figures**: sankey, pie, bar and a forecast line chart as `{data, layout}` JSON
//! - **Dashboard loading**: four independent fetch-and-render tasks with
//!   explicit outcomes and cancellation
//!
//! ## Modules
//!
//! - [`ledger`]: Transactions, categorisation rules and bank export import
//! - [`charts`]: Figure builders
//! - [`api`]: REST API server with Axum
//! - [`dashboard`]: Chart loading controller
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use finboard::charts::{build_chart, ChartKind, ChartOptions};
//! use finboard::ledger::Ledger;
//!
//! let ledger = Ledger::sample();
//! let figure = build_chart(ChartKind::Pie, &ledger, &ChartOptions::default());
//! println!("{}", serde_json::to_string_pretty(&figure).unwrap());
//! ```

pub mod api;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod ledger;
pub mod logging;

// Re-export top-level types for convenience
pub use ledger::{
    CategoryRule, Ledger, LedgerError, LedgerResult, PreprocessReport, Preprocessor, RuleSet,
    Transaction,
};

pub use charts::{build_chart, ChartKind, ChartOptions, ChartPayload, Palette};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState, DataSource};

pub use dashboard::{
    ChartOutcome, ChartRenderer, ChartSource, DashboardController, DashboardError,
    DashboardHandle, FileRenderer, HttpChartSource, MountReport, OutputFormat,
};

pub use config::{Config, ConfigError};
