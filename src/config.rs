//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::charts::{ChartOptions, Palette, Rgb};
use crate::ledger::{default_rules, CategoryRule, LedgerResult, RuleSet};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub charts: ChartsConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chart API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; any origin is allowed when empty
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:8084".to_string(),
        "http://127.0.0.1:8084".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Transaction data configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding `raw/` exports and `processed/` output
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Account number suffix of the general (current) account
    #[serde(default)]
    pub general_account_suffix: Option<String>,

    /// Account number suffix of the savings account
    #[serde(default)]
    pub savings_account_suffix: Option<String>,

    /// Serve the built-in demo ledger when no processed data exists
    #[serde(default = "default_use_sample_data")]
    pub use_sample_data: bool,

    /// Replaces the built-in categorisation rules when set
    #[serde(default)]
    pub rules: Option<Vec<CategoryRule>>,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("finboard").to_string_lossy().to_string())
        .unwrap_or_else(|| "./data".to_string())
}

fn default_use_sample_data() -> bool {
    true
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            general_account_suffix: None,
            savings_account_suffix: None,
            use_sample_data: default_use_sample_data(),
            rules: None,
        }
    }
}

impl LedgerConfig {
    /// Data directory with a leading `~` expanded to the home directory
    pub fn data_path(&self) -> PathBuf {
        let rest = match self.data_dir.as_str() {
            "~" => "",
            dir => match dir.strip_prefix("~/") {
                Some(rest) => rest,
                None => return PathBuf::from(dir),
            },
        };
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(&self.data_dir),
        }
    }

    /// Whether preprocessing can label the general account
    ///
    /// Without it senders keep their account numbers and `Ledger::load`
    /// finds no general-account rows.
    pub fn labels_general_account(&self) -> bool {
        self.general_account_suffix
            .as_deref()
            .map(|suffix| !suffix.trim().is_empty())
            .unwrap_or(false)
    }

    /// Path of the processed transactions file
    pub fn transactions_path(&self) -> PathBuf {
        self.data_path()
            .join("processed")
            .join("transactions.csv")
    }

    /// Compile the configured (or built-in) categorisation rules
    pub fn rule_set(&self) -> LedgerResult<RuleSet> {
        RuleSet::new(self.rules.clone().unwrap_or_else(default_rules))
    }
}

/// Figure building configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChartsConfig {
    #[serde(default = "default_forecast_horizon")]
    pub forecast_horizon: usize,

    /// Colour overrides as `#RRGGBB`
    #[serde(default)]
    pub positive_color: Option<String>,
    #[serde(default)]
    pub negative_color: Option<String>,
    #[serde(default)]
    pub observed_color: Option<String>,
    #[serde(default)]
    pub forecast_color: Option<String>,
}

fn default_forecast_horizon() -> usize {
    3
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            forecast_horizon: default_forecast_horizon(),
            positive_color: None,
            negative_color: None,
            observed_color: None,
            forecast_color: None,
        }
    }
}

impl ChartsConfig {
    /// Figure options, falling back to the default colour for invalid overrides
    pub fn chart_options(&self) -> ChartOptions {
        let defaults = Palette::default();
        let pick = |name: &str, value: &Option<String>, fallback: Rgb| match value {
            Some(hex) => Rgb::from_hex(hex).unwrap_or_else(|| {
                tracing::warn!("Invalid colour for charts.{}: {:?}, using default", name, hex);
                fallback
            }),
            None => fallback,
        };

        ChartOptions {
            forecast_horizon: self.forecast_horizon,
            palette: Palette {
                positive: pick("positive_color", &self.positive_color, defaults.positive),
                negative: pick("negative_color", &self.negative_color, defaults.negative),
                observed: pick("observed_color", &self.observed_color, defaults.observed),
                forecast: pick("forecast_color", &self.forecast_color, defaults.forecast),
            },
        }
    }
}

/// Dashboard loader configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the chart API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,

    /// Where rendered charts are written
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Rendered chart format: json or html
    #[serde(default = "default_output_format")]
    pub format: String,
}

fn default_api_url() -> String {
    "http://localhost:8082".to_string()
}

fn default_fetch_timeout() -> u64 {
    10_000
}

fn default_output_dir() -> String {
    "./charts".to_string()
}

fn default_output_format() -> String {
    "html".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            fetch_timeout_ms: default_fetch_timeout(),
            output_dir: default_output_dir(),
            format: default_output_format(),
        }
    }
}

impl DashboardConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("finboard").join("config.toml")),
            Some(PathBuf::from("/etc/finboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Load `path` when given, otherwise search the default locations
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup (the environment in production)
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(host) = var("FINBOARD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("FINBOARD_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        // Ledger overrides
        if let Some(data_dir) = var("FINBOARD_DATA_DIR") {
            self.ledger.data_dir = data_dir;
        }
        if let Some(suffix) = var("FINBOARD_GENERAL_ACCOUNT_ENDING") {
            self.ledger.general_account_suffix = Some(suffix);
        }
        if let Some(suffix) = var("FINBOARD_SAVINGS_ACCOUNT_ENDING") {
            self.ledger.savings_account_suffix = Some(suffix);
        }

        // Chart overrides
        if let Some(horizon) = var("FINBOARD_FORECAST_HORIZON").and_then(|h| h.parse().ok()) {
            self.charts.forecast_horizon = horizon;
        }

        // Dashboard overrides
        if let Some(url) = var("FINBOARD_API_URL") {
            self.dashboard.api_url = url;
        }

        // Logging overrides
        if let Some(level) = var("FINBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FINBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r##"# Finboard Configuration
#
# Environment variables override these settings:
# - FINBOARD_HOST
# - FINBOARD_PORT
# - FINBOARD_DATA_DIR
# - FINBOARD_GENERAL_ACCOUNT_ENDING
# - FINBOARD_SAVINGS_ACCOUNT_ENDING
# - FINBOARD_FORECAST_HORIZON
# - FINBOARD_API_URL
# - FINBOARD_LOG_LEVEL
# - FINBOARD_LOG_FORMAT

[server]
# Chart API host
host = "0.0.0.0"

# Chart API port
port = 8082

# Allowed CORS origins (empty = any)
cors_origins = ["http://localhost:8084", "http://127.0.0.1:8084"]

# Request timeout in seconds
request_timeout_secs = 30

[ledger]
# Directory with raw/ bank exports and processed/ output
# (default: the platform data directory; a leading ~ is your home)
# data_dir = "~/.local/share/finboard"

# Last digits of your account numbers, used to label senders
# general_account_suffix = "1234"
# savings_account_suffix = "5678"

# Serve demo data when no processed transactions exist
use_sample_data = true

# Custom categorisation rules replace the built-in ones. Later rules win.
# [[ledger.rules]]
# concept = "Groceries"
# keywords = ["delhaize", "carrefour"]
# is_essential = true

[charts]
# Month-ends forecast on the line chart
forecast_horizon = 3

# Colour overrides
# positive_color = "#5AA800"
# negative_color = "#AF0000"
# observed_color = "#008DEB"
# forecast_color = "#5AA800"

[dashboard]
# Chart API the dashboard loader reads from
api_url = "http://localhost:8082"

# Per-chart request timeout (ms)
fetch_timeout_ms = 10000

# Where `finboard-cli render` writes charts, and in which format (json, html)
output_dir = "./charts"
format = "html"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/finboard/finboard.log"
"##
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.charts.forecast_horizon, 3);
        assert_eq!(config.dashboard.format, "html");
        assert!(config.ledger.rules.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.cors_origins, default_cors_origins());
    }

    #[test]
    fn test_generated_config_uses_platform_data_dir() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.ledger.data_dir, default_data_dir());
        assert!(!config.ledger.transactions_path().starts_with("~"));
    }

    #[test]
    fn test_data_dir_home_expansion() {
        let mut ledger = LedgerConfig {
            data_dir: "~/finboard-data".to_string(),
            ..Default::default()
        };
        if let Some(home) = dirs::home_dir() {
            assert_eq!(ledger.data_path(), home.join("finboard-data"));
            assert_eq!(
                ledger.transactions_path(),
                home.join("finboard-data/processed/transactions.csv")
            );
        }

        ledger.data_dir = "/srv/finboard".to_string();
        assert_eq!(ledger.data_path(), PathBuf::from("/srv/finboard"));

        ledger.data_dir = "data/~cache".to_string();
        assert_eq!(ledger.data_path(), PathBuf::from("data/~cache"));
    }

    #[test]
    fn test_server_section_keeps_default_cors_origins() {
        let config = Config::parse("[server]\nport = 9000").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.cors_origins, ServerConfig::default().cors_origins);
        assert!(!config.server.cors_origins.is_empty());

        let open = Config::parse("[server]\ncors_origins = []").unwrap();
        assert!(open.server.cors_origins.is_empty());
    }

    #[test]
    fn test_labels_general_account() {
        let mut ledger = LedgerConfig::default();
        assert!(!ledger.labels_general_account());

        ledger.general_account_suffix = Some("  ".to_string());
        assert!(!ledger.labels_general_account());

        ledger.general_account_suffix = Some("1234".to_string());
        assert!(ledger.labels_general_account());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(
            r#"
[server]
port = 9000

[[ledger.rules]]
concept = "Pets"
keywords = ["zooplus"]
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.dashboard.api_url, "http://localhost:8082");

        let rules = config.ledger.rules.as_ref().unwrap();
        assert_eq!(rules[0].concept, "Pets");
        assert!(!rules[0].is_essential);
        assert_eq!(config.ledger.rule_set().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::parse("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FINBOARD_PORT", "9100"),
            ("FINBOARD_DATA_DIR", "/tmp/finboard"),
            ("FINBOARD_GENERAL_ACCOUNT_ENDING", "1234"),
            ("FINBOARD_FORECAST_HORIZON", "not-a-number"),
            ("FINBOARD_API_URL", "http://api:8082"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.ledger.data_dir, "/tmp/finboard");
        assert_eq!(config.ledger.general_account_suffix.as_deref(), Some("1234"));
        // Unparseable values leave the default in place
        assert_eq!(config.charts.forecast_horizon, 3);
        assert_eq!(config.dashboard.api_url, "http://api:8082");
        assert_eq!(
            config.ledger.transactions_path(),
            PathBuf::from("/tmp/finboard/processed/transactions.csv")
        );
    }

    #[test]
    fn test_chart_options_colours() {
        let charts = ChartsConfig {
            positive_color: Some("#00FF00".to_string()),
            negative_color: Some("nope".to_string()),
            ..Default::default()
        };
        let options = charts.chart_options();

        assert_eq!(options.palette.positive, Rgb(0, 255, 0));
        assert_eq!(options.palette.negative, Palette::default().negative);
    }
}
