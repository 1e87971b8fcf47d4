//! Offline price source backed by one CSV file per ticker.
//!
//! Files live at `<data_dir>/<TICKER>.csv` and need a `date` column
//! (`YYYY-MM-DD`) and a `close` column. Yahoo-style exports
//! (`Date,Open,High,Low,Close,Adj Close,Volume`) load as-is.

use crate::domain::errors::ForecastError;
use crate::domain::market::{PricePoint, PriceSeries};
use crate::domain::ports::{MarketDataService, validate_range};
use crate::domain::validation::StrictPriceValidator;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Close")]
    close: Option<f64>,
}

pub struct CsvMarketDataService {
    data_dir: PathBuf,
}

impl CsvMarketDataService {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, ticker: &str) -> Result<PathBuf, ForecastError> {
        let safe = !ticker.is_empty()
            && ticker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '_'));
        if !safe || ticker.starts_with('.') {
            return Err(ForecastError::invalid_request(format!(
                "ticker '{}' contains unsupported characters",
                ticker
            )));
        }
        Ok(self.data_dir.join(format!("{}.csv", ticker)))
    }
}

fn parse_rows(
    ticker: &str,
    content: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PricePoint>, ForecastError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut points = Vec::new();

    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| {
            ForecastError::provider(format!("{}.csv row {}: {}", ticker, line + 1, e))
        })?;
        let date = match NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                warn!(
                    "CsvMarketDataService: skipping {} row with date '{}': {}",
                    ticker, row.date, e
                );
                continue;
            }
        };
        // Same convention as the online provider: start inclusive, end exclusive.
        if date < start || date >= end {
            continue;
        }
        if let Some(close) = row.close {
            points.push(PricePoint::new(date, close));
        }
    }

    Ok(points)
}

#[async_trait]
impl MarketDataService for CsvMarketDataService {
    async fn get_daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ForecastError> {
        validate_range(start, end)?;
        let path = self.path_for(ticker)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("CsvMarketDataService: no file at {:?}", path);
                return Err(ForecastError::DataUnavailable {
                    ticker: ticker.to_string(),
                });
            }
            Err(e) => {
                return Err(ForecastError::provider(format!(
                    "failed to read {:?}: {}",
                    path, e
                )));
            }
        };

        let points = parse_rows(ticker, &content, start, end)?;
        let points = StrictPriceValidator::retain_valid(ticker, points);
        if points.is_empty() {
            return Err(ForecastError::DataUnavailable {
                ticker: ticker.to_string(),
            });
        }

        let series = PriceSeries::from_unordered(ticker, points)?;
        info!(
            "CsvMarketDataService: {} daily closes for {} from {:?}",
            series.len(),
            ticker,
            path
        );
        Ok(series)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
