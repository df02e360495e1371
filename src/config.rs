use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::info;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
/// Fallback concurrent-task capacity for employees without an explicit
/// capacity value.
const DEFAULT_EMPLOYEE_CAPACITY: i64 = 5;

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name (development, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON-formatted logs
    #[serde(default)]
    pub log_json: bool,

    /// Default per-employee concurrent task capacity when the employee
    /// record has none set
    #[serde(default = "default_employee_capacity")]
    #[validate(range(min = 1, max = 100))]
    pub default_employee_capacity: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_employee_capacity() -> i64 {
    DEFAULT_EMPLOYEE_CAPACITY
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Loads configuration from layered sources: `config/default.toml`, then
/// `config/<environment>.toml`, then `APP_*` environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment = env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder()
        .set_default("environment", environment.clone())?
        .set_default("database_url", "sqlite::memory:")?;

    let default_path = Path::new(CONFIG_DIR).join("default.toml");
    if default_path.exists() {
        builder = builder.add_source(File::from(default_path));
    }
    let env_path = Path::new(CONFIG_DIR).join(format!("{environment}.toml"));
    if env_path.exists() {
        builder = builder.add_source(File::from(env_path));
    }

    let settings = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let cfg: AppConfig = settings.try_deserialize()?;
    cfg.validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    info!(environment = %cfg.environment, "configuration loaded");
    Ok(cfg)
}

/// Initializes the global tracing subscriber.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        assert_eq!(default_port(), 8080);
        assert_eq!(default_employee_capacity(), 5);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn capacity_out_of_range_fails_validation() {
        let cfg = AppConfig {
            database_url: "sqlite::memory:".into(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            default_employee_capacity: 0,
        };
        assert!(cfg.validate().is_err());
    }
}
