use crate::application::forecast::Prediction;
use crate::domain::errors::ForecastError;
use crate::domain::trading::Decision;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of a successful `POST /predict`.
///
/// `dates` lines up with `historical`. `rmse`, `mae` and `r2` score
/// `predicted` against the closes it was aligned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub ticker: String,
    pub dates: Vec<NaiveDate>,
    pub historical: Vec<f64>,
    pub predicted: Vec<f64>,
    pub decision: Decision,
    pub change: f64,
    pub last_price: f64,
    pub future_price: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl From<Prediction> for PredictionResponse {
    fn from(p: Prediction) -> Self {
        Self {
            ticker: p.ticker,
            dates: p.dates,
            historical: p.historical,
            predicted: p.predicted,
            decision: p.decision,
            change: p.change,
            last_price: p.last_price,
            future_price: p.future_price,
            rmse: p.fit.rmse,
            mae: p.fit.mae,
            r2: p.fit.r2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub model_version: String,
    pub lookback: usize,
    pub uptime_seconds: u64,
}

/// Pipeline failure rendered as `{"error": ...}`.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        let status = match &err {
            ForecastError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ForecastError::DataUnavailable { .. }
            | ForecastError::InsufficientData { .. }
            | ForecastError::InsufficientVariance { .. }
            | ForecastError::ZeroBasePrice { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ForecastError::Provider { .. } => StatusCode::BAD_GATEWAY,
            ForecastError::Inference { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
