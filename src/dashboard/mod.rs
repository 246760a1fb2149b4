//! Dashboard Loader
//!
//! The view side of finboard: on mount, fetch the four figures from the
//! chart API and hand each one to a renderer as soon as it arrives.
//!
//! ## Architecture
//!
//! - **ChartSource**: where payloads come from (`HttpChartSource` for the API)
//! - **ChartRenderer**: where they are drawn (`FileRenderer` writes files)
//! - **DashboardController**: spawns one task per chart and reports outcomes
//!
//! # Example
//!
//! ```rust,no_run
//! use finboard::dashboard::{DashboardController, FileRenderer, HttpChartSource, OutputFormat};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpChartSource::new("http://localhost:8082", Duration::from_secs(10))?;
//!     let renderer = FileRenderer::new("./charts", OutputFormat::Html);
//!
//!     let report = DashboardController::new(source, renderer).mount().wait().await;
//!     for (kind, error) in report.failed() {
//!         eprintln!("{}: {}", kind, error);
//!     }
//!     Ok(())
//! }
//! ```

mod controller;
mod error;
mod render;
mod source;

pub use controller::{ChartOutcome, DashboardController, DashboardHandle, MountReport};
pub use error::{DashboardError, DashboardResult};
pub use render::{html_page, ChartRenderer, FileRenderer, OutputFormat, PLOTLY_CDN};
pub use source::{ChartSource, HttpChartSource};
