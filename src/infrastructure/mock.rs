use crate::application::ml::Forecaster;
use crate::domain::errors::ForecastError;
use crate::domain::market::{PricePoint, PriceSeries};
use crate::domain::ml::WindowBatch;
use crate::domain::ports::{MarketDataService, validate_range};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory price source. Ignores the requested range and returns
/// everything stored for the ticker.
#[derive(Clone, Default)]
pub struct MockMarketDataService {
    series: Arc<RwLock<HashMap<String, Vec<PricePoint>>>>,
    fetches: Arc<AtomicUsize>,
}

impl MockMarketDataService {
    pub fn new() -> Self {
        Self::default()
    }

    /// One close per calendar day starting 2024-01-01.
    pub fn with_closes(ticker: &str, closes: Vec<f64>) -> Self {
        let mut series = HashMap::new();
        series.insert(ticker.to_string(), daily_points(closes));
        Self {
            series: Arc::new(RwLock::new(series)),
            fetches: Arc::default(),
        }
    }

    pub async fn insert(&self, ticker: &str, closes: Vec<f64>) {
        self.series
            .write()
            .await
            .insert(ticker.to_string(), daily_points(closes));
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

fn daily_points(closes: Vec<f64>) -> Vec<PricePoint> {
    let origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    closes
        .into_iter()
        .enumerate()
        .filter_map(|(i, close)| {
            origin
                .checked_add_days(Days::new(i as u64))
                .map(|date| PricePoint::new(date, close))
        })
        .collect()
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn get_daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ForecastError> {
        validate_range(start, end)?;
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let series = self.series.read().await;
        match series.get(ticker) {
            Some(points) if !points.is_empty() => {
                debug!("MockMarketDataService: {} rows for {}", points.len(), ticker);
                PriceSeries::new(ticker, points.clone())
            }
            _ => Err(ForecastError::DataUnavailable {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

enum MockBehavior {
    /// Repeats the last value of each window.
    Persistence,
    /// Returns the same normalized value for every window.
    Constant(f64),
    /// Returns exactly these values, whatever the batch size.
    Fixed(Vec<f64>),
}

/// Deterministic stand-in for the ONNX model.
pub struct MockForecaster {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockForecaster {
    pub fn persistence() -> Self {
        Self::with_behavior(MockBehavior::Persistence)
    }

    pub fn constant(value: f64) -> Self {
        Self::with_behavior(MockBehavior::Constant(value))
    }

    pub fn fixed(values: Vec<f64>) -> Self {
        Self::with_behavior(MockBehavior::Fixed(values))
    }

    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Forecaster for MockForecaster {
    fn forecast(&self, batch: &WindowBatch) -> Result<Vec<f64>, ForecastError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let values = match &self.behavior {
            MockBehavior::Persistence => batch
                .windows()
                .rows()
                .into_iter()
                .map(|row| row.iter().last().copied().unwrap_or_default() as f64)
                .collect(),
            MockBehavior::Constant(value) => vec![*value; batch.len()],
            MockBehavior::Fixed(values) => values.clone(),
        };
        Ok(values)
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn version(&self) -> &str {
        "test"
    }
}
