pub mod pipeline;
pub mod types;

pub use pipeline::ForecastPipeline;
pub use types::{Prediction, PredictionRequest};
