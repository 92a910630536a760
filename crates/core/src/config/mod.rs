//! Configuration management for the GiftGrid core
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Catalog configuration
    pub catalog: CatalogConfig,

    /// Supplier sync configuration
    pub sync: SyncConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Default page size for catalog listings
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Maximum page size a caller may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Maximum number of per-item errors kept on a sync log row
    #[serde(default = "default_max_recorded_errors")]
    pub max_recorded_errors: usize,

    /// Caller-side timeout for one full sync run in seconds (0 to disable).
    /// The engine itself never times out; this is advisory for callers.
    #[serde(default = "default_sync_timeout")]
    pub run_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_page_size() -> usize { 20 }
fn default_max_page_size() -> usize { 100 }
fn default_max_recorded_errors() -> usize { 100 }
fn default_sync_timeout() -> u64 { 0 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "giftgrid".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        // Pull in .env before reading APP_* variables
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("catalog.default_page_size", default_page_size() as i64)?
            .set_default("catalog.max_page_size", default_max_page_size() as i64)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__CATALOG__DEFAULT_PAGE_SIZE=50
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the advisory sync run timeout as Duration (None when disabled)
    pub fn sync_run_timeout(&self) -> Option<Duration> {
        match self.sync.run_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Clamp a requested page size to the configured bounds
    pub fn clamp_page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.catalog.default_page_size)
            .clamp(1, self.catalog.max_page_size)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                default_page_size: default_page_size(),
                max_page_size: default_max_page_size(),
            },
            sync: SyncConfig {
                max_recorded_errors: default_max_recorded_errors(),
                run_timeout_secs: default_sync_timeout(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                service_name: default_service_name(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.catalog.default_page_size, 20);
        assert_eq!(config.observability.service_name, "giftgrid");
    }

    #[test]
    fn test_sync_timeout_disabled_by_default() {
        let config = AppConfig::default();
        assert!(config.sync_run_timeout().is_none());
    }

    #[test]
    fn test_clamp_page_size() {
        let config = AppConfig::default();
        assert_eq!(config.clamp_page_size(None), 20);
        assert_eq!(config.clamp_page_size(Some(10)), 10);
        assert_eq!(config.clamp_page_size(Some(10_000)), 100);
        assert_eq!(config.clamp_page_size(Some(0)), 1);
    }
}
