use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use validator::Validate;

use crate::errors::ServiceError;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";

/// Application configuration, layered from `config/default.toml`, an
/// environment-specific file, and `APP__`-prefixed environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Application environment
    #[serde(default = "default_env")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Run pending migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Maximum database connections
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    /// Minimum database connections
    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,

    /// Prefix for adjustment reference numbers (`{prefix}-YYYYMM-NN`)
    #[serde(default = "default_adjustment_prefix")]
    pub adjustment_reference_prefix: String,

    /// Event channel capacity
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_env() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_adjustment_prefix() -> String {
    "ADJ".to_string()
}

fn default_event_buffer() -> usize {
    100
}

impl AppConfig {
    /// Minimal constructor used by tests and embedding callers.
    pub fn new(database_url: String, environment: String) -> Self {
        Self {
            database_url,
            environment,
            log_level: default_log_level(),
            auto_migrate: false,
            db_max_connections: default_max_connections(),
            db_min_connections: default_min_connections(),
            adjustment_reference_prefix: default_adjustment_prefix(),
            event_buffer: default_event_buffer(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Initializes tracing using the provided log level as the default filter.
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("stockroom_api={}", level);
    let filter_directive = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads and validates the application configuration.
pub fn load_config() -> Result<AppConfig, ServiceError> {
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());
    let config_dir = Path::new(CONFIG_DIR);

    let settings = Config::builder()
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()
        .map_err(|e| ServiceError::ConfigError(e.to_string()))?;

    let config: AppConfig = settings
        .try_deserialize()
        .map_err(|e| ServiceError::ConfigError(e.to_string()))?;

    config.validate()?;
    info!(
        environment = %config.environment,
        "configuration loaded"
    );
    Ok(config)
}
