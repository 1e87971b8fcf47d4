//! Prometheus metrics definitions for Pricecast
//!
//! All metrics use the `pricecast_` prefix.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the forecasting service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Successful predictions by decision label
    pub predictions_total: CounterVec,
    /// Failed predictions by error kind
    pub prediction_errors_total: CounterVec,
    /// Market data fetch latency in seconds
    pub fetch_latency_seconds: HistogramVec,
    /// Model inference latency in seconds
    pub inference_latency_seconds: HistogramVec,
    /// Uptime in seconds
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new("pricecast_predictions_total", "Predictions served by decision"),
            &["decision"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_errors_total = CounterVec::new(
            Opts::new(
                "pricecast_prediction_errors_total",
                "Failed predictions by error kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(prediction_errors_total.clone()))?;

        let fetch_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pricecast_fetch_latency_seconds",
                "Market data fetch latency in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["provider"],
        )?;
        registry.register(Box::new(fetch_latency_seconds.clone()))?;

        let inference_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "pricecast_inference_latency_seconds",
                "Model inference latency in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
            &["model"],
        )?;
        registry.register(Box::new(inference_latency_seconds.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "pricecast_uptime_seconds",
            "Server uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            prediction_errors_total,
            fetch_latency_seconds,
            inference_latency_seconds,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_predictions(&self, decision: &str) {
        self.predictions_total.with_label_values(&[decision]).inc();
    }

    pub fn inc_errors(&self, kind: &str) {
        self.prediction_errors_total.with_label_values(&[kind]).inc();
    }

    pub fn observe_fetch_latency(&self, provider: &str, latency: f64) {
        self.fetch_latency_seconds
            .with_label_values(&[provider])
            .observe(latency);
    }

    pub fn observe_inference_latency(&self, model: &str, latency: f64) {
        self.inference_latency_seconds
            .with_label_values(&[model])
            .observe(latency);
    }
}
