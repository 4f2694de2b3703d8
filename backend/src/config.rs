//! Configuration management for Shoplog
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SHOPLOG_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::StockPolicy;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Stock health policy thresholds
    pub stock_policy: StockPolicyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

/// Stock policy thresholds, in whole stock units / days.
#[derive(Debug, Deserialize, Clone)]
pub struct StockPolicyConfig {
    /// Stock below this counts as low
    pub low_stock_threshold: i64,

    /// Stock above this with no recent sales counts as slow-moving
    pub overstock_threshold: i64,

    /// Trailing window for the sales velocity signal
    pub sales_window_days: i64,
}

impl StockPolicyConfig {
    /// Convert to the domain policy used by the classifier and metrics.
    pub fn to_policy(&self) -> StockPolicy {
        StockPolicy {
            low_stock_threshold: Decimal::from(self.low_stock_threshold),
            overstock_threshold: Decimal::from(self.overstock_threshold),
            sales_window_days: self.sales_window_days,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SHOPLOG_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("stock_policy.low_stock_threshold", 5)?
            .set_default("stock_policy.overstock_threshold", 20)?
            .set_default("stock_policy.sales_window_days", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SHOPLOG_ prefix)
            .add_source(
                Environment::with_prefix("SHOPLOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
