//! Configuration module for Pricecast.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Server, Model, Market Data, and Observability.

mod market_data_config;
mod model_config;
mod observability_config;
mod server_config;

pub use market_data_config::{MarketDataEnvConfig, MarketDataProvider};
pub use model_config::ModelEnvConfig;
pub use observability_config::ObservabilityEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerEnvConfig,
    pub model: ModelEnvConfig,
    pub market_data: MarketDataEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Callers are expected to have loaded `.env` (via `dotenvy`) first.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerEnvConfig::from_env().context("Failed to load server config")?,
            model: ModelEnvConfig::from_env().context("Failed to load model config")?,
            market_data: MarketDataEnvConfig::from_env()
                .context("Failed to load market data config")?,
            observability: ObservabilityEnvConfig::from_env()
                .context("Failed to load observability config")?,
        })
    }
}
