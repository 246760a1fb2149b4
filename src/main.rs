//! Finboard API Server
//!
//! Run with: cargo run --bin finboard
//!
//! # Configuration
//!
//! Read from `--config <path>` or the default locations (see
//! [`finboard::config::Config::load_default`]), then overridden by:
//! - `FINBOARD_HOST`: Host to bind to (default: 0.0.0.0)
//! - `FINBOARD_PORT`: Port to listen on (default: 8082)
//! - `FINBOARD_DATA_DIR`: Directory holding `processed/transactions.csv`
//! - `FINBOARD_FORECAST_HORIZON`: Month-ends forecast on the line chart (default: 3)
//! - `RUST_LOG`: Log filter, takes precedence over `FINBOARD_LOG_LEVEL`

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;

use finboard::api::{serve, ApiConfig, AppState, DataSource};
use finboard::config::{Config, LedgerConfig};
use finboard::ledger::Ledger;
use finboard::logging::init_logging;

#[derive(Parser)]
#[command(name = "finboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serve the personal financial dashboard charts")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overrides the config
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::resolve(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_logging(&config.logging)?;

    tracing::info!("Starting Finboard API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.ledger.data_path());

    let (ledger, data_source) = load_ledger(&config.ledger)?;
    tracing::info!(
        transactions = ledger.len(),
        source = data_source.as_str(),
        "Ledger loaded"
    );

    let api_config = ApiConfig::from(&config.server);
    let state = AppState::new(ledger, api_config.clone())
        .with_data_source(data_source)
        .with_chart_options(config.charts.chart_options());

    serve(state, &api_config).await?;

    tracing::info!("Finboard API server stopped");
    Ok(())
}

/// Load the processed transactions, or the demo ledger when allowed
fn load_ledger(config: &LedgerConfig) -> anyhow::Result<(Ledger, DataSource)> {
    let path = config.transactions_path();

    if path.exists() {
        let ledger = Ledger::load(&path)
            .with_context(|| format!("Failed to load transactions from {}", path.display()))?;
        return Ok((ledger, DataSource::Processed));
    }

    if !config.use_sample_data {
        bail!(
            "No processed transactions at {} (run `finboard-cli preprocess` first)",
            path.display()
        );
    }

    tracing::warn!(
        "No processed transactions at {}, serving sample data",
        path.display()
    );
    Ok((Ledger::sample(), DataSource::Sample))
}
