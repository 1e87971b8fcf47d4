pub mod market_data;

pub use market_data::{DEFAULT_CHART_URL, YahooMarketDataService};
