//! HTTP surface: the static page, `POST /predict`, `GET /health` and `GET /metrics`.

pub mod handlers;
pub mod responses;

pub use handlers::AppState;
pub use responses::{ErrorResponse, HealthResponse, PredictionResponse};

use axum::Router;
use axum::routing::{get, post};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}
