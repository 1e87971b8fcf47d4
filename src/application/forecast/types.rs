use crate::domain::errors::ForecastError;
use crate::domain::ml::FitMetrics;
use crate::domain::ports::validate_range;
use crate::domain::trading::Decision;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single prediction request: which ticker, over which history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PredictionRequest {
    /// Normalizes the ticker and checks the date range.
    pub fn new(ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Self, ForecastError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(ForecastError::invalid_request("ticker must not be empty"));
        }
        validate_range(start, end)?;
        Ok(Self { ticker, start, end })
    }

    /// Parses `YYYY-MM-DD` date strings, as submitted by the web form.
    pub fn parse(ticker: &str, start: &str, end: &str) -> Result<Self, ForecastError> {
        let start = parse_date("start", start)?;
        let end = parse_date("end", end)?;
        Self::new(ticker, start, end)
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ForecastError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ForecastError::invalid_request(format!("{} date '{}' is invalid: {}", field, value, e))
    })
}

/// Pipeline output for one request.
///
/// `historical` and `predicted` are in price units. `dates[i]` is the date of
/// `historical[i]`; `predicted[j]` estimates `historical[j + lookback]`.
/// `change`, `last_price` and `future_price` are rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub ticker: String,
    pub dates: Vec<NaiveDate>,
    pub historical: Vec<f64>,
    pub predicted: Vec<f64>,
    pub fit: FitMetrics,
    pub decision: Decision,
    pub change: f64,
    pub last_price: f64,
    pub future_price: f64,
}
