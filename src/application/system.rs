use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::application::forecast::ForecastPipeline;
use crate::application::ml::{Forecaster, OnnxForecaster};
use crate::config::{Config, MarketDataProvider};
use crate::domain::ports::MarketDataService;
use crate::infrastructure::csv_market_data::CsvMarketDataService;
use crate::infrastructure::observability::Metrics;
use crate::infrastructure::yahoo::YahooMarketDataService;
use crate::interfaces::http::{self, AppState};

pub struct Application {
    pub config: Config,
    pub pipeline: Arc<ForecastPipeline>,
    pub metrics: Metrics,
}

impl Application {
    /// Loads the model and wires the configured price source.
    ///
    /// A model that fails to load aborts startup: the service never answers
    /// requests without one.
    pub fn build(config: Config) -> Result<Self> {
        info!(
            "Building Pricecast Application (provider: {:?}, lookback: {})...",
            config.market_data.provider, config.model.lookback
        );

        let forecaster: Arc<dyn Forecaster> = Arc::new(
            OnnxForecaster::load(&config.model.model_path)
                .context("Model must load before the server can start")?,
        );
        let market_service = build_market_service(&config);

        Self::from_parts(config, market_service, forecaster)
    }

    /// Wires an application around pre-built services.
    pub fn from_parts(
        config: Config,
        market_service: Arc<dyn MarketDataService>,
        forecaster: Arc<dyn Forecaster>,
    ) -> Result<Self> {
        let metrics = Metrics::new().context("Failed to register metrics")?;

        let pipeline = ForecastPipeline::new(
            market_service,
            forecaster,
            config.model.lookback,
            config.model.thresholds,
        )
        .with_metrics(metrics.clone());

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            metrics,
        })
    }

    pub fn router(&self) -> axum::Router {
        http::router(AppState {
            pipeline: self.pipeline.clone(),
            metrics: self.metrics.clone(),
            started: Instant::now(),
        })
    }

    /// Serves HTTP until Ctrl+C.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("Listening on http://{}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown signal received. Draining connections...");
                }
            })
            .await
            .context("HTTP server failed")
    }
}

pub fn build_market_service(config: &Config) -> Arc<dyn MarketDataService> {
    let market = &config.market_data;
    match market.provider {
        MarketDataProvider::Yahoo => {
            info!("Using Yahoo Finance ({})", market.yahoo_chart_url);
            Arc::new(YahooMarketDataService::new(
                market.yahoo_chart_url.clone(),
                market.timeout,
                market.max_retries,
            ))
        }
        MarketDataProvider::Csv => {
            info!("Using CSV price files from {:?}", market.csv_data_dir);
            Arc::new(CsvMarketDataService::new(market.csv_data_dir.clone()))
        }
    }
}
