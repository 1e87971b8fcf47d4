use crate::domain::errors::ForecastError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Daily closing prices for a single ticker.
///
/// Dates are strictly increasing: no duplicates, no out-of-order rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from points that are already in chronological order.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, ForecastError> {
        let ticker = ticker.into();

        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(ForecastError::invalid_request(format!(
                "price series for {} is not strictly increasing ({} then {})",
                ticker, pair[0].date, pair[1].date
            )));
        }
        if let Some(bad) = points.iter().find(|p| !p.close.is_finite()) {
            return Err(ForecastError::invalid_request(format!(
                "price series for {} has a non-finite close on {}",
                ticker, bad.date
            )));
        }

        Ok(Self { ticker, points })
    }

    /// Sorts provider rows by date and keeps the last row seen for each date.
    pub fn from_unordered(
        ticker: impl Into<String>,
        mut points: Vec<PricePoint>,
    ) -> Result<Self, ForecastError> {
        // Stable sort keeps provider order within a date, so the last row wins below.
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self::new(ticker, deduped)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
