use crate::domain::errors::ForecastError;
use crate::domain::ml::WindowBatch;

/// Interface for pretrained sequence models.
pub trait Forecaster: Send + Sync {
    /// Predict one normalized next value per window, in window order.
    fn forecast(&self, batch: &WindowBatch) -> Result<Vec<f64>, ForecastError>;

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
