//! Tracing setup shared by the binaries

use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{ConfigError, LoggingConfig};

/// Install the global subscriber described by `config`
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("finboard={},tower_http=info", config.level))
    });

    let json = config.format.eq_ignore_ascii_case("json");

    let fmt_layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ConfigError::Logging(format!("{}: {}", path, e)))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            if json {
                layer.json().boxed()
            } else {
                layer.boxed()
            }
        }
        None => {
            let layer = tracing_subscriber::fmt::layer();
            if json {
                layer.json().boxed()
            } else {
                layer.boxed()
            }
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}
