//! Push-based observability for Pricecast
//!
//! Metrics are kept in a Prometheus registry and pushed as structured JSON
//! logs to stdout. No scrape endpoint is exposed.

pub mod metrics;
pub mod reporter;

pub use metrics::Metrics;
pub use reporter::MetricsReporter;
