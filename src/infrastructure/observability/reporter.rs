//! Push-based metrics reporter for Pricecast
//!
//! Periodically outputs metrics as structured JSON to stdout.
//! The HTTP server does not expose a scrape endpoint.

use crate::domain::errors::ForecastError;
use crate::domain::trading::Decision;
use crate::infrastructure::observability::metrics::Metrics;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Metrics snapshot for JSON output
#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub model: String,
    pub predictions: BTreeMap<String, u64>,
    pub errors: BTreeMap<String, u64>,
}

/// Push-based metrics reporter
///
/// Outputs metrics as structured JSON logs on a configurable interval.
pub struct MetricsReporter {
    metrics: Metrics,
    model: String,
    start_time: Instant,
    interval: Duration,
}

impl MetricsReporter {
    /// Create a new metrics reporter
    ///
    /// # Arguments
    /// * `metrics` - Shared Prometheus metrics
    /// * `model` - Name of the loaded model, echoed in every snapshot
    /// * `interval_seconds` - How often to output metrics (default: 60)
    pub fn new(metrics: Metrics, model: impl Into<String>, interval_seconds: u64) -> Self {
        Self {
            metrics,
            model: model.into(),
            start_time: Instant::now(),
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Run the reporter in a loop, outputting metrics periodically
    pub async fn run(self) {
        info!(
            "MetricsReporter: Starting push-based metrics (interval: {:?})",
            self.interval
        );

        loop {
            tokio::time::sleep(self.interval).await;

            let snapshot = self.collect_snapshot();
            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    // Prefix so log shippers can filter metric lines
                    println!("METRICS_JSON:{}", json);
                    info!(
                        "Predictions: {} | Errors: {} | Uptime: {}s",
                        snapshot.predictions.values().sum::<u64>(),
                        snapshot.errors.values().sum::<u64>(),
                        snapshot.uptime_seconds
                    );
                }
                Err(e) => warn!("Failed to serialize metrics: {}", e),
            }
        }
    }

    pub fn collect_snapshot(&self) -> MetricsSnapshot {
        let uptime = self.start_time.elapsed().as_secs();
        self.metrics.uptime_seconds.set(uptime as f64);

        let predictions = Decision::ALL
            .iter()
            .map(|d| {
                let count = self
                    .metrics
                    .predictions_total
                    .with_label_values(&[d.as_str()])
                    .get();
                (d.as_str().to_string(), count as u64)
            })
            .collect();

        let errors = ForecastError::KINDS
            .iter()
            .map(|kind| {
                let count = self
                    .metrics
                    .prediction_errors_total
                    .with_label_values(&[*kind])
                    .get();
                (kind.to_string(), count as u64)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        MetricsSnapshot {
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
            model: self.model.clone(),
            predictions,
            errors,
        }
    }
}
