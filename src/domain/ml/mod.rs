pub mod fit_metrics;
pub mod scaler;
pub mod windowing;

pub use fit_metrics::FitMetrics;
pub use scaler::MinMaxScaler;
pub use windowing::WindowBatch;
