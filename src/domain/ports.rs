use crate::domain::errors::ForecastError;
use crate::domain::market::PriceSeries;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of daily closing prices.
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Closes for `ticker` from `start` (inclusive) to `end` (exclusive),
    /// in chronological order.
    ///
    /// Returns `DataUnavailable` when the provider has no rows for the ticker.
    async fn get_daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ForecastError>;

    /// Provider label for logs and metrics.
    fn name(&self) -> &str;
}

/// Shared range check for provider implementations.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), ForecastError> {
    if start > end {
        return Err(ForecastError::invalid_request(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok(())
}
