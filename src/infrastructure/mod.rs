pub mod core;
pub mod csv_market_data;
pub mod mock;
pub mod observability;
pub mod yahoo;
