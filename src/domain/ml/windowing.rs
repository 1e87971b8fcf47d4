use crate::domain::errors::ForecastError;
use ndarray::Array2;

/// Overlapping fixed-length windows cut from a normalized series.
///
/// Window `i` covers `series[i..i + lookback]` and targets index `i + lookback`.
#[derive(Debug, Clone)]
pub struct WindowBatch {
    windows: Array2<f32>,
    targets: Vec<usize>,
    lookback: usize,
}

impl WindowBatch {
    pub fn build(normalized: &[f64], lookback: usize) -> Result<Self, ForecastError> {
        if lookback == 0 {
            return Err(ForecastError::invalid_request("lookback must be positive"));
        }
        if normalized.len() <= lookback {
            return Err(ForecastError::InsufficientData {
                available: normalized.len(),
                required: lookback + 1,
            });
        }

        let count = normalized.len() - lookback;
        let windows = Array2::from_shape_fn((count, lookback), |(row, col)| {
            normalized[row + col] as f32
        });
        let targets = (lookback..normalized.len()).collect();

        Ok(Self {
            windows,
            targets,
            lookback,
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn windows(&self) -> &Array2<f32> {
        &self.windows
    }

    /// Index in the source series that each window predicts.
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Model input shape: batch x lookback x 1 feature.
    pub fn tensor_shape(&self) -> [usize; 3] {
        [self.len(), self.lookback, 1]
    }

    /// Row-major buffer matching [`tensor_shape`](Self::tensor_shape).
    pub fn to_tensor_data(&self) -> Vec<f32> {
        self.windows.iter().copied().collect()
    }
}
