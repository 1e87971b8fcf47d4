use super::responses::{ApiError, HealthResponse, PredictionResponse};
use crate::application::forecast::{ForecastPipeline, PredictionRequest};
use crate::infrastructure::observability::Metrics;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse};
use axum::{Form, Json};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ForecastPipeline>,
    pub metrics: Metrics,
    pub started: Instant,
}

/// Fields of the prediction form. `start_date` / `end_date` are accepted as aliases.
#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub ticker: String,
    #[serde(alias = "start_date")]
    pub start: String,
    #[serde(alias = "end_date")]
    pub end: String,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let forecaster = state.pipeline.forecaster();
    Json(HealthResponse {
        status: "ok".to_string(),
        model: forecaster.name().to_string(),
        model_version: forecaster.version().to_string(),
        lookback: state.pipeline.lookback(),
        uptime_seconds: state.started.elapsed().as_secs(),
    })
}

/// Prometheus text exposition, served on the main listener.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state
        .metrics
        .uptime_seconds
        .set(state.started.elapsed().as_secs_f64());
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub async fn predict(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<PredictionResponse>, ApiError> {
    let form = read_form(request).await?;
    let request = PredictionRequest::parse(&form.ticker, &form.start, &form.end)?;

    let span = info_span!("predict", request_id = %Uuid::new_v4(), ticker = %request.ticker);
    async move {
        let started = Instant::now();
        let prediction = state.pipeline.predict(&request).await?;
        info!(
            "{} -> {} in {} ms",
            request.ticker,
            prediction.decision,
            started.elapsed().as_millis()
        );
        Ok::<_, ApiError>(Json(PredictionResponse::from(prediction)))
    }
    .instrument(span)
    .await
}

/// Accepts urlencoded, multipart and JSON bodies.
async fn read_form(request: Request) -> Result<PredictForm, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let Json(form) = Json::<PredictForm>::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(form)
    } else if content_type.starts_with("multipart/form-data") {
        read_multipart(request).await
    } else {
        let Form(form) = Form::<PredictForm>::from_request(request, &())
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(form)
    }
}

async fn read_multipart(request: Request) -> Result<PredictForm, ApiError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let mut fields: HashMap<String, String> = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        fields.insert(name, value);
    }

    // Same field names and aliases as the other body types.
    serde_json::to_value(&fields)
        .and_then(serde_json::from_value::<PredictForm>)
        .map_err(|e| ApiError::bad_request(format!("Invalid form fields: {}", e)))
}
