//! Pricecast Server - next-day price forecasts over HTTP
//!
//! Loads the ONNX model once, then serves `GET /`, `POST /predict` and
//! `GET /health`. Metrics are pushed via structured JSON logs to stdout.
//!
//! # Usage
//! ```sh
//! MODEL_PATH=model/lstm_model.onnx cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `MODEL_PATH` - ONNX model file (default: model/lstm_model.onnx)
//! - `LOOKBACK` - Window length the model was trained with (default: 100)
//! - `SERVER_BIND_ADDRESS` / `SERVER_PORT` - Listen address (default: 127.0.0.1:8080)
//! - `MARKET_DATA_PROVIDER` - `yahoo` or `csv` (default: yahoo)
//! - `OBSERVABILITY_ENABLED` - Enable metrics reporting (default: true)
//! - `OBSERVABILITY_INTERVAL` - Interval in seconds between metric outputs (default: 60)

use anyhow::Result;
use pricecast::application::system::Application;
use pricecast::config::Config;
use pricecast::infrastructure::observability::MetricsReporter;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Pricecast Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: Model={:?}, Lookback={}, Provider={:?}",
        config.model.model_path, config.model.lookback, config.market_data.provider
    );

    // Model load failure ends the process here.
    let app = Application::build(config.clone())?;

    if config.observability.enabled {
        let reporter = MetricsReporter::new(
            app.metrics.clone(),
            app.pipeline.forecaster().name(),
            config.observability.interval_secs,
        );

        tokio::spawn(async move {
            reporter.run().await;
        });

        info!(
            "Metrics reporter started (interval: {}s)",
            config.observability.interval_secs
        );
    } else {
        info!("Metrics reporting disabled.");
    }

    app.serve().await?;
    info!("Server stopped.");

    Ok(())
}
