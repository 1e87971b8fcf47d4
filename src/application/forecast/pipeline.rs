use super::types::{Prediction, PredictionRequest};
use crate::application::ml::Forecaster;
use crate::domain::errors::ForecastError;
use crate::domain::ml::{FitMetrics, MinMaxScaler, WindowBatch};
use crate::domain::ports::MarketDataService;
use crate::domain::trading::{Decision, DecisionThresholds, percent_change, round2};
use crate::infrastructure::observability::Metrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fetch -> normalize -> window -> forecast -> inverse-scale -> classify.
///
/// Holds only read-only handles. The scaler is fit inside every call and
/// dropped with it, so concurrent requests never share scaling parameters.
pub struct ForecastPipeline {
    market_data: Arc<dyn MarketDataService>,
    forecaster: Arc<dyn Forecaster>,
    lookback: usize,
    thresholds: DecisionThresholds,
    metrics: Option<Metrics>,
}

impl ForecastPipeline {
    pub fn new(
        market_data: Arc<dyn MarketDataService>,
        forecaster: Arc<dyn Forecaster>,
        lookback: usize,
        thresholds: DecisionThresholds,
    ) -> Self {
        Self {
            market_data,
            forecaster,
            lookback,
            thresholds,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn forecaster(&self) -> &Arc<dyn Forecaster> {
        &self.forecaster
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, ForecastError> {
        let result = self.run(request).await;

        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(prediction) => metrics.inc_predictions(prediction.decision.as_str()),
                Err(e) => metrics.inc_errors(e.kind()),
            }
        }
        if let Err(e) = &result {
            warn!("Prediction for {} failed: {}", request.ticker, e);
        }

        result
    }

    async fn run(&self, request: &PredictionRequest) -> Result<Prediction, ForecastError> {
        let fetch_start = Instant::now();
        let series = self
            .market_data
            .get_daily_closes(&request.ticker, request.start, request.end)
            .await?;
        if let Some(metrics) = &self.metrics {
            metrics.observe_fetch_latency(
                self.market_data.name(),
                fetch_start.elapsed().as_secs_f64(),
            );
        }

        if series.is_empty() {
            return Err(ForecastError::DataUnavailable {
                ticker: request.ticker.clone(),
            });
        }
        if series.len() <= self.lookback {
            return Err(ForecastError::InsufficientData {
                available: series.len(),
                required: self.lookback + 1,
            });
        }
        debug!(
            "Fetched {} closes for {} ({} -> {})",
            series.len(),
            request.ticker,
            request.start,
            request.end
        );

        // Fit on the full fetched range, lookback context included.
        let historical = series.closes();
        let scaler = MinMaxScaler::fit(&historical)?;
        let normalized = scaler.transform(&historical);
        let batch = WindowBatch::build(&normalized, self.lookback)?;

        let window_count = batch.len();
        let actual: Vec<f64> = batch.targets().iter().map(|&i| historical[i]).collect();
        let inference_start = Instant::now();
        let forecaster = Arc::clone(&self.forecaster);
        let normalized_forecast = tokio::task::spawn_blocking(move || forecaster.forecast(&batch))
            .await
            .map_err(|e| ForecastError::inference(format!("inference task failed: {}", e)))??;
        if let Some(metrics) = &self.metrics {
            metrics.observe_inference_latency(
                self.forecaster.name(),
                inference_start.elapsed().as_secs_f64(),
            );
        }

        if normalized_forecast.len() != window_count {
            return Err(ForecastError::inference(format!(
                "expected {} forecasts, got {}",
                window_count,
                normalized_forecast.len()
            )));
        }

        if let Some((index, value)) = normalized_forecast
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(ForecastError::inference(format!(
                "model returned non-finite value {} for window {}",
                value, index
            )));
        }

        let predicted = scaler.inverse_transform(&normalized_forecast);
        let fit = FitMetrics::compute(&actual, &predicted).ok_or_else(|| {
            ForecastError::inference("forecast does not line up with the fetched closes")
        })?;

        let (last_price, future_price) = match (historical.last(), predicted.last()) {
            (Some(&last), Some(&future)) => (last, future),
            _ => {
                return Err(ForecastError::InsufficientData {
                    available: historical.len(),
                    required: self.lookback + 1,
                });
            }
        };
        let change = percent_change(last_price, future_price)?;
        let decision = Decision::from_change(change, &self.thresholds);

        info!(
            "{}: last={:.2} forecast={:.2} change={:.2}% -> {} ({} windows, rmse={:.4})",
            request.ticker, last_price, future_price, change, decision, window_count, fit.rmse
        );

        Ok(Prediction {
            ticker: request.ticker.clone(),
            dates: series.dates(),
            historical,
            predicted,
            fit,
            decision,
            change: round2(change),
            last_price: round2(last_price),
            future_price: round2(future_price),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::{MockForecaster, MockMarketDataService};
    use chrono::NaiveDate;

    fn request() -> PredictionRequest {
        PredictionRequest::new(
            "AAPL",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_constant_series_reports_insufficient_variance() {
        let market = Arc::new(MockMarketDataService::with_closes("AAPL", vec![50.0; 20]));
        let forecaster = Arc::new(MockForecaster::persistence());
        let pipeline = ForecastPipeline::new(
            market,
            forecaster.clone(),
            10,
            DecisionThresholds::default(),
        );

        let err = pipeline.predict(&request()).await.unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientVariance { .. }));
        assert_eq!(forecaster.call_count(), 0);
    }

    #[tokio::test]
    async fn test_short_series_skips_inference() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let market = Arc::new(MockMarketDataService::with_closes("AAPL", closes));
        let forecaster = Arc::new(MockForecaster::persistence());
        let metrics = Metrics::new().unwrap();
        let pipeline = ForecastPipeline::new(
            market,
            forecaster.clone(),
            10,
            DecisionThresholds::default(),
        )
        .with_metrics(metrics.clone());

        let err = pipeline.predict(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData {
                available: 10,
                required: 11
            }
        ));
        assert_eq!(forecaster.call_count(), 0);
        assert_eq!(
            metrics
                .prediction_errors_total
                .with_label_values(&["insufficient_data"])
                .get(),
            1.0
        );
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_data_unavailable() {
        let market = Arc::new(MockMarketDataService::new());
        let pipeline = ForecastPipeline::new(
            market,
            Arc::new(MockForecaster::persistence()),
            10,
            DecisionThresholds::default(),
        );

        let err = pipeline.predict(&request()).await.unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_forecast_is_aligned_and_rescaled() {
        // Closes 100..=120, lookback 10 -> 11 windows.
        let closes: Vec<f64> = (0..=20).map(|i| 100.0 + i as f64).collect();
        let market = Arc::new(MockMarketDataService::with_closes("AAPL", closes.clone()));
        let forecaster = Arc::new(MockForecaster::persistence());
        let pipeline = ForecastPipeline::new(
            market,
            forecaster.clone(),
            10,
            DecisionThresholds::default(),
        );

        let prediction = pipeline.predict(&request()).await.unwrap();

        assert_eq!(prediction.historical, closes);
        assert_eq!(prediction.predicted.len(), 11);
        // Persistence repeats each window's last value.
        assert!((prediction.predicted[0] - 109.0).abs() < 1e-3);
        assert!((prediction.predicted[10] - 119.0).abs() < 1e-3);
        assert_eq!(prediction.last_price, 120.0);
        assert_eq!(prediction.future_price, 119.0);
        assert_eq!(prediction.change, -0.83);
        assert_eq!(prediction.decision, Decision::Hold);
        assert_eq!(forecaster.call_count(), 1);

        // Each forecast trails its target by exactly one unit.
        assert_eq!(prediction.dates.len(), 21);
        assert!((prediction.fit.mae - 1.0).abs() < 1e-3);
        assert!((prediction.fit.rmse - 1.0).abs() < 1e-3);
        assert!(prediction.fit.r2 > 0.8);
    }

    #[tokio::test]
    async fn test_non_finite_model_output_is_inference_error() {
        let closes: Vec<f64> = (0..=20).map(|i| 100.0 + i as f64).collect();
        let market = Arc::new(MockMarketDataService::with_closes("AAPL", closes));
        let metrics = Metrics::new().unwrap();
        let pipeline = ForecastPipeline::new(
            market,
            Arc::new(MockForecaster::constant(f64::NAN)),
            10,
            DecisionThresholds::default(),
        )
        .with_metrics(metrics.clone());

        let err = pipeline.predict(&request()).await.unwrap_err();
        assert_eq!(err.kind(), "inference");
        assert_eq!(
            metrics.predictions_total.with_label_values(&["HOLD"]).get(),
            0.0
        );
    }

    #[tokio::test]
    async fn test_model_output_length_mismatch_is_inference_error() {
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let market = Arc::new(MockMarketDataService::with_closes("AAPL", closes));
        let pipeline = ForecastPipeline::new(
            market,
            Arc::new(MockForecaster::fixed(vec![0.5])),
            10,
            DecisionThresholds::default(),
        );

        let err = pipeline.predict(&request()).await.unwrap_err();
        assert_eq!(err.kind(), "inference");
    }
}
