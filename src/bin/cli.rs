//! Finboard CLI
//!
//! Command-line interface for Finboard operations:
//! - Preprocess raw bank exports
//! - Render the dashboard charts from a running API
//! - Check API status
//! - Generate a config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use finboard::charts::ChartKind;
use finboard::config::{generate_default_config, Config};
use finboard::dashboard::{
    ChartOutcome, DashboardController, DashboardError, FileRenderer, HttpChartSource, OutputFormat,
};
use finboard::ledger::Preprocessor;
use finboard::logging::init_logging;

#[derive(Parser)]
#[command(name = "finboard-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal financial dashboard tools")]
#[command(long_about = "Finboard turns bank exports into a categorised ledger and renders\nsankey, pie, bar and forecast charts from it.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import raw bank exports into the processed transactions file
    Preprocess {
        /// Import every raw export again and rewrite the processed data
        #[arg(long)]
        reprocess: bool,
    },

    /// Fetch the charts from the API and render them to files
    Render {
        /// API server URL (default: from config)
        #[arg(long)]
        api_url: Option<String>,
        /// Output directory (default: from config)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Output format (json, html)
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Charts to render (default: all)
        #[arg(long = "chart")]
        charts: Vec<ChartKind>,
    },

    /// Show API status
    Status {
        /// API server URL (default: from config)
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Printing a config must work even when the current one is broken
    if let Commands::Config { output } = &cli.command {
        return write_config(output.as_ref());
    }

    let config = Config::resolve(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Preprocess { reprocess } => {
            if !config.ledger.labels_general_account() {
                tracing::warn!(
                    "ledger.general_account_suffix is not set: senders keep their account \
                     numbers and the chart API will find no general-account transactions"
                );
            }

            let rules = config.ledger.rule_set()?;
            let preprocessor = Preprocessor::new(config.ledger.data_path(), rules).with_accounts(
                config.ledger.general_account_suffix.as_deref(),
                config.ledger.savings_account_suffix.as_deref(),
            );

            let report = preprocessor.run(reprocess)?;

            if report.files.is_empty() {
                println!("No new files in {:?}", preprocessor.raw_dir());
                return Ok(());
            }

            println!("Preprocessing results:");
            println!("  Files imported: {}", report.files.len());
            for file in &report.files {
                println!("    {}", file);
            }
            println!("  Transactions: {}", report.transactions);
            println!("  Rows failed: {}", report.rows_failed);
            println!("  Output: {:?}", preprocessor.transactions_path());

            if !report.errors.is_empty() {
                println!();
                println!("Errors (first 10):");
                for error in report.errors.iter().take(10) {
                    println!("  {}", error);
                }
            }
        }

        Commands::Render {
            api_url,
            out,
            format,
            charts,
        } => {
            let api_url = api_url.unwrap_or(config.dashboard.api_url.clone());
            let out = out.unwrap_or_else(|| PathBuf::from(&config.dashboard.output_dir));
            let format = match format {
                Some(format) => format,
                None => config
                    .dashboard
                    .format
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))?,
            };
            let charts = if charts.is_empty() {
                ChartKind::ALL.to_vec()
            } else {
                charts
            };

            let source = HttpChartSource::new(&api_url, config.dashboard.fetch_timeout())?;
            let renderer = FileRenderer::new(&out, format);
            let controller = DashboardController::new(source, renderer);

            let outcomes = render_charts(&controller, &charts).await;
            let failed = outcomes.iter().filter(|o| !o.is_rendered()).count();

            println!();
            println!(
                "Rendered {}/{} charts into {:?}",
                outcomes.len() - failed,
                outcomes.len(),
                out
            );

            if failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::Status { api_url } => {
            let api_url = api_url.unwrap_or(config.dashboard.api_url.clone());
            let response = reqwest::Client::new()
                .get(format!("{}/health", api_url.trim_end_matches('/')))
                .timeout(config.dashboard.fetch_timeout())
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Finboard v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Data source: {}",
                        health["data_source"].as_str().unwrap_or("unknown")
                    );
                    if let Some(transactions) = health["transactions"].as_u64() {
                        println!("Transactions: {}", transactions);
                    }
                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Finboard API at {}", api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Finboard API server is running:");
                    eprintln!("  cargo run --bin finboard");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => write_config(output.as_ref())?,
    }

    Ok(())
}

/// Load `charts` and print each outcome as it arrives; Ctrl+C cancels the rest
async fn render_charts(
    controller: &DashboardController<HttpChartSource, FileRenderer>,
    charts: &[ChartKind],
) -> Vec<ChartOutcome> {
    let mut handle = controller.mount_charts(charts);
    let mut outcomes = Vec::with_capacity(charts.len());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            outcome = handle.next() => match outcome {
                Some(outcome) => {
                    print_outcome(controller, &outcome);
                    outcomes.push(outcome);
                }
                None => break,
            },
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                eprintln!("Interrupted, cancelling {} pending charts", handle.pending());
                handle.cancel();
            }
        }
    }

    // Tasks that panicked never report; count them as failed
    for &kind in charts {
        if !outcomes.iter().any(|o| o.kind == kind) {
            let outcome = ChartOutcome {
                kind,
                result: Err(DashboardError::TaskFailed(kind)),
            };
            print_outcome(controller, &outcome);
            outcomes.push(outcome);
        }
    }

    outcomes
}

fn print_outcome(
    controller: &DashboardController<HttpChartSource, FileRenderer>,
    outcome: &ChartOutcome,
) {
    match &outcome.result {
        Ok(()) => println!(
            "  {:<8} ok      {:?}",
            outcome.kind,
            controller.renderer().path_for(outcome.kind.mount_id())
        ),
        Err(e) if e.is_cancelled() => println!("  {:<8} skipped", outcome.kind),
        Err(e) => println!("  {:<8} failed  {}", outcome.kind, e),
    }
}

fn write_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }

    Ok(())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
