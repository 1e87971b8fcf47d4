use crate::domain::errors::ForecastError;
use crate::domain::market::{PricePoint, PriceSeries};
use crate::domain::ports::{MarketDataService, validate_range};
use crate::domain::validation::StrictPriceValidator;
use crate::infrastructure::core::HttpClientFactory;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

pub const DEFAULT_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// ===== Chart API response =====

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

// ===== Market Data Service =====

/// Daily closes from the Yahoo Finance chart endpoint.
pub struct YahooMarketDataService {
    client: ClientWithMiddleware,
    chart_base_url: String,
}

impl YahooMarketDataService {
    pub fn new(chart_base_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            client: HttpClientFactory::create_client(timeout, max_retries),
            chart_base_url: chart_base_url.into(),
        }
    }

    /// `end` is exclusive: period2 is midnight UTC of the end date.
    fn chart_url(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Url, ForecastError> {
        let mut url = Url::parse(&self.chart_base_url).map_err(ForecastError::provider)?;
        url.path_segments_mut()
            .map_err(|_| ForecastError::provider("chart URL cannot take a ticker path"))?
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("period1", &midnight_utc(start).to_string())
            .append_pair("period2", &midnight_utc(end).to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history");
        Ok(url)
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Turns a chart payload into a validated series.
pub(crate) fn parse_chart(
    ticker: &str,
    response: ChartResponse,
) -> Result<PriceSeries, ForecastError> {
    if let Some(err) = response.chart.error {
        debug!(
            "YahooMarketDataService: chart error for {}: {} - {}",
            ticker, err.code, err.description
        );
        return Err(ForecastError::DataUnavailable {
            ticker: ticker.to_string(),
        });
    }

    let unavailable = || ForecastError::DataUnavailable {
        ticker: ticker.to_string(),
    };

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(unavailable)?;
    let timestamps = data.timestamp.unwrap_or_default();
    let closes = data
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    // Rows with a null close (halts, partial days) are skipped.
    let points: Vec<PricePoint> = timestamps
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let close = close?;
            let date = DateTime::from_timestamp(ts + data.meta.gmtoffset, 0)?.date_naive();
            Some(PricePoint::new(date, close))
        })
        .collect();

    let points = StrictPriceValidator::retain_valid(ticker, points);
    if points.is_empty() {
        return Err(unavailable());
    }

    PriceSeries::from_unordered(ticker, points)
}

/// Yahoo answers an empty range or unknown symbol with a 4xx carrying a
/// `chart.error` body. Those mean "no rows", not a provider outage.
fn client_error(ticker: &str, status: StatusCode, body: &str) -> ForecastError {
    let chart_error = serde_json::from_str::<ChartResponse>(body)
        .ok()
        .and_then(|payload| payload.chart.error);

    match chart_error {
        Some(err) => {
            debug!(
                "YahooMarketDataService: {} for {}: {} - {}",
                status, ticker, err.code, err.description
            );
            ForecastError::DataUnavailable {
                ticker: ticker.to_string(),
            }
        }
        None if status == StatusCode::NOT_FOUND => ForecastError::DataUnavailable {
            ticker: ticker.to_string(),
        },
        None => {
            error!(
                "YahooMarketDataService: chart fetch for {} failed with {}: {}",
                ticker, status, body
            );
            ForecastError::provider(format!("HTTP {}", status))
        }
    }
}

#[async_trait]
impl MarketDataService for YahooMarketDataService {
    async fn get_daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, ForecastError> {
        validate_range(start, end)?;
        let url = self.chart_url(ticker, start, end)?;

        let response = self
            .client
            .get(url)
            .header("User-Agent", "Mozilla/5.0")
            .send()
            .await
            .map_err(|e| ForecastError::provider(format!("chart request failed: {}", e)))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(client_error(ticker, status, &body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "YahooMarketDataService: chart fetch for {} failed with {}: {}",
                ticker, status, body
            );
            return Err(ForecastError::provider(format!("HTTP {}", status)));
        }

        let payload: ChartResponse = response
            .json()
            .await
            .map_err(|e| ForecastError::provider(format!("invalid chart payload: {}", e)))?;

        let series = parse_chart(ticker, payload)?;
        info!(
            "YahooMarketDataService: {} daily closes for {} ({} -> {})",
            series.len(),
            ticker,
            start,
            end
        );
        Ok(series)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<PriceSeries, ForecastError> {
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        parse_chart("AAPL", response)
    }

    #[test]
    fn test_parse_chart_skips_null_closes() {
        // 2024-01-02/03/04 14:30 UTC, exchange offset -5h
        let json = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-18000},
            "timestamp":[1704205800,1704292200,1704378600],
            "indicators":{"quote":[{"close":[185.64,null,181.91]}]}
        }],"error":null}}"#;

        let series = parse(json).unwrap();
        assert_eq!(series.closes(), vec![185.64, 181.91]);
        assert_eq!(
            series.points()[1].date,
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()
        );
    }

    #[test]
    fn test_parse_chart_error_is_data_unavailable() {
        let json = r#"{"chart":{"result":null,"error":{
            "code":"Not Found","description":"No data found, symbol may be delisted"
        }}}"#;
        assert!(matches!(parse(json), Err(ForecastError::DataUnavailable { .. })));
    }

    #[test]
    fn test_parse_chart_without_rows_is_data_unavailable() {
        let json = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(parse(json), Err(ForecastError::DataUnavailable { .. })));
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        )
    }

    /// Serves one canned chart response on a local port.
    async fn chart_server(status: axum::http::StatusCode, body: &'static str) -> String {
        let app = axum::Router::new().route(
            "/chart/{ticker}",
            axum::routing::get(move || async move { (status, body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/chart", addr)
    }

    fn service(base: String) -> YahooMarketDataService {
        YahooMarketDataService::new(base, Duration::from_secs(5), 0)
    }

    #[tokio::test]
    async fn test_bad_request_with_chart_error_is_data_unavailable() {
        let body = r#"{"chart":{"result":null,"error":{
            "code":"Bad Request",
            "description":"Data doesn't exist for startDate = 1704153600, endDate = 1704153600"
        }}}"#;
        let base = chart_server(axum::http::StatusCode::BAD_REQUEST, body).await;
        let (start, end) = range();

        let err = service(base).get_daily_closes("AAPL", start, end).await.unwrap_err();
        assert_eq!(err.kind(), "data_unavailable");
    }

    #[tokio::test]
    async fn test_bad_request_without_chart_body_is_provider_error() {
        let base = chart_server(axum::http::StatusCode::BAD_REQUEST, "rate limited").await;
        let (start, end) = range();

        let err = service(base).get_daily_closes("AAPL", start, end).await.unwrap_err();
        assert_eq!(err.kind(), "provider");
    }

    #[tokio::test]
    async fn test_server_error_is_provider_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Internal","description":"oops"}}}"#;
        let base = chart_server(axum::http::StatusCode::INTERNAL_SERVER_ERROR, body).await;
        let (start, end) = range();

        let err = service(base).get_daily_closes("AAPL", start, end).await.unwrap_err();
        assert_eq!(err.kind(), "provider");
    }

    #[tokio::test]
    async fn test_successful_fetch_returns_series() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-18000},
            "timestamp":[1704205800,1704292200],
            "indicators":{"quote":[{"close":[185.64,184.25]}]}
        }],"error":null}}"#;
        let base = chart_server(axum::http::StatusCode::OK, body).await;
        let (start, end) = range();

        let series = service(base).get_daily_closes("AAPL", start, end).await.unwrap();
        assert_eq!(series.closes(), vec![185.64, 184.25]);
        assert_eq!(series.ticker(), "AAPL");
    }

    #[test]
    fn test_chart_url_encodes_ticker_and_range() {
        let service = YahooMarketDataService::new(DEFAULT_CHART_URL, Duration::from_secs(5), 0);
        let url = service
            .chart_url(
                "BRK/B",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            )
            .unwrap();

        let url = url.as_str();
        assert!(url.starts_with("https://query1.finance.yahoo.com/v8/finance/chart/BRK%2FB?"));
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("period2=1704153600"));
        assert!(url.contains("interval=1d"));
    }
}
