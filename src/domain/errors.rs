use thiserror::Error;

/// Message returned to clients when the fetched history cannot fill one window.
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Insufficient data to predict";

/// Errors raised while turning a price history into a forecast.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("No price data available for {ticker}")]
    DataUnavailable { ticker: String },

    #[error("Insufficient data to predict")]
    InsufficientData { available: usize, required: usize },

    #[error("Price series has no variance (all closes equal {value})")]
    InsufficientVariance { value: f64 },

    #[error("Cannot compute percent change from a base price of {price}")]
    ZeroBasePrice { price: f64 },

    #[error("Market data provider failed: {reason}")]
    Provider { reason: String },

    #[error("Model inference failed: {reason}")]
    Inference { reason: String },
}

impl ForecastError {
    pub const KINDS: [&'static str; 7] = [
        "invalid_request",
        "data_unavailable",
        "insufficient_data",
        "insufficient_variance",
        "zero_base_price",
        "provider",
        "inference",
    ];

    /// Short stable label, used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ForecastError::InvalidRequest { .. } => "invalid_request",
            ForecastError::DataUnavailable { .. } => "data_unavailable",
            ForecastError::InsufficientData { .. } => "insufficient_data",
            ForecastError::InsufficientVariance { .. } => "insufficient_variance",
            ForecastError::ZeroBasePrice { .. } => "zero_base_price",
            ForecastError::Provider { .. } => "provider",
            ForecastError::Inference { .. } => "inference",
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        ForecastError::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub fn provider(reason: impl std::fmt::Display) -> Self {
        ForecastError::Provider {
            reason: reason.to_string(),
        }
    }

    pub fn inference(reason: impl std::fmt::Display) -> Self {
        ForecastError::Inference {
            reason: reason.to_string(),
        }
    }
}
