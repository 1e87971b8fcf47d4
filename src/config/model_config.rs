//! Model and decision configuration parsing from environment variables.
//!
//! The lookback length must match the window length the model was trained
//! with; the loader cannot check it.

use crate::domain::trading::DecisionThresholds;
use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;

/// Model environment configuration
#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    pub lookback: usize,
    pub thresholds: DecisionThresholds,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model/lstm_model.onnx"),
            lookback: 100,
            thresholds: DecisionThresholds::default(),
        }
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        let lookback = Self::parse_usize("LOOKBACK", 100)?;
        if lookback == 0 {
            bail!("LOOKBACK must be greater than zero");
        }

        let strong = Self::parse_f64("DECISION_STRONG_PCT", 5.0)?;
        let mild = Self::parse_f64("DECISION_MILD_PCT", 2.0)?;
        let thresholds = DecisionThresholds::new(strong, mild)
            .context("Invalid DECISION_STRONG_PCT / DECISION_MILD_PCT")?;

        Ok(Self {
            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model/lstm_model.onnx")),
            lookback,
            thresholds,
        })
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }
}
