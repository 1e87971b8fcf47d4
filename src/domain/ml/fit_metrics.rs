use serde::{Deserialize, Serialize};

/// In-sample fit of the model over the fetched range, in price units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    pub rmse: f64,
    pub mae: f64,
    /// 0.0 when the actual values have no variance.
    pub r2: f64,
}

impl FitMetrics {
    /// Returns `None` for empty or mismatched inputs.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Option<Self> {
        if actual.is_empty() || actual.len() != predicted.len() {
            return None;
        }
        let n = actual.len() as f64;

        let sq_err: f64 = predicted
            .iter()
            .zip(actual)
            .map(|(p, t)| (p - t).powi(2))
            .sum();
        let mae = predicted
            .iter()
            .zip(actual)
            .map(|(p, t)| (p - t).abs())
            .sum::<f64>()
            / n;

        let mean = actual.iter().sum::<f64>() / n;
        let var = actual.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
        let mse = sq_err / n;
        let r2 = if var > 0.0 { 1.0 - mse / var } else { 0.0 };

        Some(Self {
            rmse: mse.sqrt(),
            mae,
            r2,
        })
    }
}
