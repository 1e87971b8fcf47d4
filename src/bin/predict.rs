//! One-shot forecast from the command line.
//!
//! Runs the same pipeline as `POST /predict` and prints the JSON body.

use anyhow::{Context, Result};
use clap::Parser;
use pricecast::application::forecast::PredictionRequest;
use pricecast::application::system::{Application, build_market_service};
use pricecast::application::ml::{Forecaster, OnnxForecaster};
use pricecast::config::{Config, MarketDataProvider};
use pricecast::interfaces::http::{ErrorResponse, PredictionResponse};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(author, version, about = "Next-day price forecast for one ticker", long_about = None)]
struct Cli {
    /// Ticker symbol
    #[arg(short, long)]
    ticker: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: String,

    /// End date (YYYY-MM-DD, exclusive)
    #[arg(long)]
    end: String,

    /// ONNX model file (overrides MODEL_PATH)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Window length (overrides LOOKBACK)
    #[arg(short, long)]
    lookback: Option<usize>,

    /// Price source: yahoo or csv (overrides MARKET_DATA_PROVIDER)
    #[arg(long)]
    provider: Option<MarketDataProvider>,

    /// Directory of <TICKER>.csv files for the csv provider
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays pure JSON.
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config.model.model_path = model;
    }
    if let Some(lookback) = cli.lookback {
        anyhow::ensure!(lookback > 0, "--lookback must be greater than zero");
        config.model.lookback = lookback;
    }
    if let Some(provider) = cli.provider {
        config.market_data.provider = provider;
    }
    if let Some(dir) = cli.data_dir {
        config.market_data.csv_data_dir = dir;
    }

    let forecaster: Arc<dyn Forecaster> = Arc::new(OnnxForecaster::load(&config.model.model_path)?);
    let market_service = build_market_service(&config);
    let app = Application::from_parts(config, market_service, forecaster)?;

    let outcome = match PredictionRequest::parse(&cli.ticker, &cli.start, &cli.end) {
        Ok(request) => app.pipeline.predict(&request).await,
        Err(e) => Err(e),
    };

    let (json, code) = match outcome {
        Ok(prediction) => (
            serde_json::to_string_pretty(&PredictionResponse::from(prediction)),
            ExitCode::SUCCESS,
        ),
        Err(e) => (
            serde_json::to_string_pretty(&ErrorResponse {
                error: e.to_string(),
            }),
            ExitCode::FAILURE,
        ),
    };
    println!("{}", json.context("Failed to serialize response")?);

    Ok(code)
}
