use pricecast::application::forecast::{ForecastPipeline, Prediction, PredictionRequest};
use pricecast::domain::errors::ForecastError;
use pricecast::domain::trading::{Decision, DecisionThresholds, percent_change};
use pricecast::infrastructure::csv_market_data::CsvMarketDataService;
use pricecast::infrastructure::mock::{MockForecaster, MockMarketDataService};
use pricecast::infrastructure::observability::Metrics;
use std::sync::Arc;

fn request(ticker: &str) -> PredictionRequest {
    PredictionRequest::parse(ticker, "2024-01-01", "2024-12-31").unwrap()
}

/// Flat at 84 then a final close of 100. With a 16-wide range every price
/// used below scales to an exactly representable value.
fn flat_then_last(n: usize) -> Vec<f64> {
    let mut closes = vec![84.0; n - 1];
    closes.push(100.0);
    closes
}

/// Normalized model output that maps back to `price`.
fn normalized(price: f64) -> f64 {
    (price - 84.0) / 16.0
}

fn pipeline(
    closes: Vec<f64>,
    forecaster: Arc<MockForecaster>,
    lookback: usize,
) -> ForecastPipeline {
    ForecastPipeline::new(
        Arc::new(MockMarketDataService::with_closes("SPY", closes)),
        forecaster,
        lookback,
        DecisionThresholds::default(),
    )
}

async fn predict_at(price: f64) -> Prediction {
    let p = pipeline(
        flat_then_last(8),
        Arc::new(MockForecaster::constant(normalized(price))),
        3,
    );
    p.predict(&request("spy")).await.unwrap()
}

#[tokio::test]
async fn test_decision_ladder_end_to_end() {
    let cases = [
        (106.0, Decision::StrongBuy, 6.0),
        (103.0, Decision::Buy, 3.0),
        (100.0, Decision::Hold, 0.0),
        (97.0, Decision::Sell, -3.0),
        (94.0, Decision::StrongSell, -6.0),
    ];

    for (price, expected, change) in cases {
        let prediction = predict_at(price).await;

        assert_eq!(prediction.ticker, "SPY");
        assert_eq!(prediction.decision, expected, "forecast {}", price);
        assert_eq!(prediction.change, change);
        assert_eq!(prediction.future_price, price);
        assert_eq!(prediction.last_price, 100.0);
    }
}

#[tokio::test]
async fn test_threshold_boundaries_are_not_strong() {
    // Each forecast lands exactly on a threshold, before any rounding.
    let cases = [
        (105.0, 5.0, Decision::Buy),
        (102.0, 2.0, Decision::Hold),
        (98.0, -2.0, Decision::Hold),
        (95.0, -5.0, Decision::Sell),
    ];

    for (price, change, expected) in cases {
        assert_eq!(percent_change(100.0, price).unwrap(), change);

        let prediction = predict_at(price).await;
        assert_eq!(prediction.future_price, price);
        assert_eq!(prediction.change, change);
        assert_eq!(prediction.decision, expected, "forecast {}", price);
    }
}

#[tokio::test]
async fn test_output_lengths_follow_window_count() {
    let closes: Vec<f64> = (0..50).map(|i| 200.0 + (i % 7) as f64).collect();
    let p = pipeline(closes, Arc::new(MockForecaster::persistence()), 20);

    let prediction = p.predict(&request("SPY")).await.unwrap();
    assert_eq!(prediction.historical.len(), 50);
    assert_eq!(prediction.predicted.len(), 30);
    assert_eq!(prediction.historical[0], 200.0);
}

#[tokio::test]
async fn test_exactly_lookback_rows_skips_inference() {
    let forecaster = Arc::new(MockForecaster::persistence());
    let p = pipeline(flat_then_last(5), forecaster.clone(), 5);

    let err = p.predict(&request("SPY")).await.unwrap_err();
    assert!(matches!(
        err,
        ForecastError::InsufficientData {
            available: 5,
            required: 6
        }
    ));
    assert_eq!(err.to_string(), "Insufficient data to predict");
    assert_eq!(forecaster.call_count(), 0);
}

#[tokio::test]
async fn test_metrics_count_outcomes() {
    let metrics = Metrics::new().unwrap();
    let market = Arc::new(MockMarketDataService::with_closes("SPY", flat_then_last(8)));
    let p = ForecastPipeline::new(
        market.clone(),
        Arc::new(MockForecaster::constant(normalized(106.0))),
        3,
        DecisionThresholds::default(),
    )
    .with_metrics(metrics.clone());

    p.predict(&request("SPY")).await.unwrap();
    p.predict(&request("SPY")).await.unwrap();
    assert!(p.predict(&request("QQQ")).await.is_err());

    assert_eq!(
        metrics
            .predictions_total
            .with_label_values(&["STRONG BUY"])
            .get(),
        2.0
    );
    assert_eq!(
        metrics
            .prediction_errors_total
            .with_label_values(&["data_unavailable"])
            .get(),
        1.0
    );
    assert_eq!(market.fetch_count(), 3);
}

#[tokio::test]
async fn test_csv_provider_feeds_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = String::from("Date,Close\n");
    for day in 1..=20 {
        body.push_str(&format!("2024-03-{:02},{}\n", day, 50.0 + day as f64));
    }
    std::fs::write(dir.path().join("ACME.csv"), body).unwrap();

    let p = ForecastPipeline::new(
        Arc::new(CsvMarketDataService::new(dir.path().to_path_buf())),
        Arc::new(MockForecaster::persistence()),
        5,
        DecisionThresholds::default(),
    );

    // End is exclusive: 2024-03-01 ..= 2024-03-15.
    let request = PredictionRequest::parse("acme", "2024-03-01", "2024-03-16").unwrap();
    let prediction = p.predict(&request).await.unwrap();

    assert_eq!(prediction.historical.len(), 15);
    assert_eq!(prediction.predicted.len(), 10);
    assert_eq!(prediction.last_price, 65.0);
    // Persistence replays the previous close: 64 vs 65.
    assert_eq!(prediction.future_price, 64.0);
    assert_eq!(prediction.decision, Decision::Hold);
}
