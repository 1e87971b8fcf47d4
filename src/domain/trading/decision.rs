use crate::domain::errors::ForecastError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade recommendation derived from the forecast delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl Decision {
    pub const ALL: [Decision; 5] = [
        Decision::StrongBuy,
        Decision::Buy,
        Decision::Hold,
        Decision::Sell,
        Decision::StrongSell,
    ];

    /// Classifies a percent change. Checks run strong-before-mild on each
    /// side and use strict inequalities, so a change of exactly a threshold
    /// falls into the milder bucket.
    pub fn from_change(change_pct: f64, thresholds: &DecisionThresholds) -> Self {
        if change_pct > thresholds.strong_pct {
            Decision::StrongBuy
        } else if change_pct > thresholds.mild_pct {
            Decision::Buy
        } else if change_pct < -thresholds.strong_pct {
            Decision::StrongSell
        } else if change_pct < -thresholds.mild_pct {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::StrongBuy => "STRONG BUY",
            Decision::Buy => "BUY",
            Decision::Hold => "HOLD",
            Decision::Sell => "SELL",
            Decision::StrongSell => "STRONG SELL",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percent-change cut-offs, symmetric around zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionThresholds {
    pub strong_pct: f64,
    pub mild_pct: f64,
}

impl DecisionThresholds {
    pub fn new(strong_pct: f64, mild_pct: f64) -> Result<Self, ForecastError> {
        if !(mild_pct > 0.0 && strong_pct > mild_pct) {
            return Err(ForecastError::invalid_request(format!(
                "decision thresholds must satisfy 0 < mild ({}) < strong ({})",
                mild_pct, strong_pct
            )));
        }
        Ok(Self {
            strong_pct,
            mild_pct,
        })
    }
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            strong_pct: 5.0,
            mild_pct: 2.0,
        }
    }
}

/// `(forecast - last) / last * 100`. A zero or non-finite base price is rejected.
pub fn percent_change(last_price: f64, forecast_price: f64) -> Result<f64, ForecastError> {
    if last_price == 0.0 || !last_price.is_finite() {
        return Err(ForecastError::ZeroBasePrice { price: last_price });
    }
    Ok((forecast_price - last_price) / last_price * 100.0)
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
