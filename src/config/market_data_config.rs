//! Market data provider configuration parsing from environment variables.

use crate::infrastructure::yahoo::DEFAULT_CHART_URL;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which price source backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketDataProvider {
    Yahoo,
    Csv,
}

impl FromStr for MarketDataProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(MarketDataProvider::Yahoo),
            "csv" => Ok(MarketDataProvider::Csv),
            _ => anyhow::bail!(
                "Invalid MARKET_DATA_PROVIDER: {}. Must be 'yahoo' or 'csv'",
                s
            ),
        }
    }
}

/// Market data environment configuration
#[derive(Debug, Clone)]
pub struct MarketDataEnvConfig {
    pub provider: MarketDataProvider,
    pub yahoo_chart_url: String,
    pub csv_data_dir: PathBuf,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for MarketDataEnvConfig {
    fn default() -> Self {
        Self {
            provider: MarketDataProvider::Yahoo,
            yahoo_chart_url: DEFAULT_CHART_URL.to_string(),
            csv_data_dir: PathBuf::from("data"),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

impl MarketDataEnvConfig {
    pub fn from_env() -> Result<Self> {
        let provider_str =
            env::var("MARKET_DATA_PROVIDER").unwrap_or_else(|_| "yahoo".to_string());
        let provider = MarketDataProvider::from_str(&provider_str)?;

        let timeout_secs = env::var("MARKET_DATA_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("Failed to parse MARKET_DATA_TIMEOUT_SECS")?;

        let max_retries = env::var("MARKET_DATA_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .context("Failed to parse MARKET_DATA_MAX_RETRIES")?;

        Ok(Self {
            provider,
            yahoo_chart_url: env::var("YAHOO_CHART_URL")
                .unwrap_or_else(|_| DEFAULT_CHART_URL.to_string()),
            csv_data_dir: env::var("CSV_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            timeout: Duration::from_secs(timeout_secs.max(1)),
            max_retries,
        })
    }
}
