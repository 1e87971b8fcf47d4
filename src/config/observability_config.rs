//! Observability configuration parsing from environment variables.
//!
//! This module handles loading the push-based metrics reporter settings.

use anyhow::{Context, Result, bail};
use std::env;

/// Observability environment configuration
#[derive(Debug, Clone)]
pub struct ObservabilityEnvConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for ObservabilityEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

impl ObservabilityEnvConfig {
    pub fn from_env() -> Result<Self> {
        let enabled = env::var("OBSERVABILITY_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .context("Failed to parse OBSERVABILITY_ENABLED (expected true or false)")?;
        let interval_secs = env::var("OBSERVABILITY_INTERVAL")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .context("Failed to parse OBSERVABILITY_INTERVAL")?;
        if interval_secs == 0 {
            bail!("OBSERVABILITY_INTERVAL must be greater than zero");
        }

        Ok(Self {
            enabled,
            interval_secs,
        })
    }
}
