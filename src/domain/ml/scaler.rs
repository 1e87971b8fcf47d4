//! Min-max scaling of closing prices.
//!
//! A scaler is fit on exactly one fetched series and must be used to invert
//! the model output of that same request. Scalers are never shared between
//! requests.

use crate::domain::errors::ForecastError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    data_min: f64,
    data_max: f64,
    range_min: f64,
    range_max: f64,
}

impl MinMaxScaler {
    /// Fits a scaler mapping `values` onto `[0, 1]`.
    pub fn fit(values: &[f64]) -> Result<Self, ForecastError> {
        Self::fit_with_range(values, 0.0, 1.0)
    }

    /// Fits a scaler mapping `values` onto `[range_min, range_max]`.
    pub fn fit_with_range(
        values: &[f64],
        range_min: f64,
        range_max: f64,
    ) -> Result<Self, ForecastError> {
        if !(range_min < range_max) {
            return Err(ForecastError::invalid_request(format!(
                "scaler range [{}, {}] is empty",
                range_min, range_max
            )));
        }
        if values.is_empty() {
            return Err(ForecastError::InsufficientData {
                available: 0,
                required: 1,
            });
        }

        let (data_min, data_max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if data_max - data_min == 0.0 {
            return Err(ForecastError::InsufficientVariance { value: data_min });
        }

        Ok(Self {
            data_min,
            data_max,
            range_min,
            range_max,
        })
    }

    fn scale(&self) -> f64 {
        (self.range_max - self.range_min) / (self.data_max - self.data_min)
    }

    pub fn transform_one(&self, value: f64) -> f64 {
        (value - self.data_min) * self.scale() + self.range_min
    }

    pub fn inverse_transform_one(&self, value: f64) -> f64 {
        (value - self.range_min) / self.scale() + self.data_min
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform_one(v)).collect()
    }

    pub fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.inverse_transform_one(v)).collect()
    }
}
