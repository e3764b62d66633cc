use crate::catalog::CategoryCatalog;
use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub engine: EngineConfig,
    pub categories: CategoryCatalog,
    pub logging: LoggingConfig,
}

impl Config {
    /// Rejects settings the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "backend.base_url must not be empty".to_string(),
            ));
        }
        if self.engine.raw_sample_limit == 0 {
            return Err(ConfigError::ValidationError(
                "engine.raw_sample_limit must be greater than zero".to_string(),
            ));
        }
        let share = self.engine.tier1_delivery_share;
        if share < Decimal::ZERO || share > Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "engine.tier1_delivery_share must be within [0, 1], got {}",
                share
            )));
        }
        Ok(())
    }
}

/// Where the finance data lives and what the three query shapes target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Root URL of the REST gateway, without the `/rest/v1` suffix.
    pub base_url: String,
    /// Sent as both the `apikey` header and the bearer token.
    pub api_key: String,
    /// Tier 1: materialized daily aggregate view.
    pub aggregate_view: String,
    pub aggregate_date_field: String,
    /// Tier 2: remote procedure returning the full summary.
    pub summary_rpc: String,
    /// Tier 3: raw transaction-detail source.
    pub transactions_source: String,
    pub transactions_date_field: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            aggregate_view: "finance_summary_daily".to_string(),
            aggregate_date_field: "date_field".to_string(),
            summary_rpc: "get_finance_summary".to_string(),
            transactions_source: "ozon_finance_transactions".to_string(),
            transactions_date_field: "operation_date_msk".to_string(),
        }
    }
}

/// Tunables for the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hard cap on rows pulled from the raw source, for both the summary
    /// fallback and the breakdown table.
    pub raw_sample_limit: usize,
    /// Fraction of tier 1 service costs reported as delivery; the rest is
    /// reported as services.
    pub tier1_delivery_share: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            raw_sample_limit: 100,
            tier1_delivery_share: dec!(0.30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file here.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

/// Command-line overrides layered on top of file and environment settings.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ConfigOverrides {
    /// Path to the configuration file (defaults to `config.toml`).
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub config: Option<PathBuf>,

    /// Override the backend root URL.
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub base_url: Option<String>,

    /// Override the log filter (e.g. "debug", "engine=trace").
    #[cfg_attr(feature = "clap", arg(long, global = true))]
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.backend.base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
