use super::predictor::Forecaster;
use crate::domain::errors::ForecastError;
use crate::domain::ml::WindowBatch;
use anyhow::{Context, Result, bail};
use ort::session::Session;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

/// LSTM forecaster exported to ONNX.
///
/// Expects a single float input of shape `[batch, lookback, 1]` and produces
/// one value per batch row.
pub struct OnnxForecaster {
    session: Mutex<Session>,
    name: String,
}

impl OnnxForecaster {
    /// Loads the model. Failure here is fatal for the server.
    pub fn load(model_path: impl Into<PathBuf>) -> Result<Self> {
        let model_path = model_path.into();
        if !model_path.exists() {
            bail!("ONNX model file not found at {:?}", model_path);
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {:?}", model_path))?;

        info!("Successfully loaded ONNX model from {:?}", model_path);

        let name = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx-model")
            .to_string();

        Ok(Self {
            session: Mutex::new(session),
            name,
        })
    }
}

impl Forecaster for OnnxForecaster {
    fn forecast(&self, batch: &WindowBatch) -> Result<Vec<f64>, ForecastError> {
        let [rows, lookback, features] = batch.tensor_shape();
        let shape = vec![rows, lookback, features];
        let flat_data = batch.to_tensor_data();

        let input_value = ort::value::Value::from_array((shape.as_slice(), flat_data))
            .map_err(|e| ForecastError::inference(format!("Input value creation failed: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ForecastError::inference(format!("Session lock failed: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(ForecastError::inference)?;

        let output_value = outputs
            .iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| ForecastError::inference("No output found"))?;
        let (_, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(ForecastError::inference)?;

        let predictions: Vec<f64> = data.iter().map(|&v| v as f64).collect();
        if predictions.len() != rows {
            return Err(ForecastError::inference(format!(
                "model returned {} values for {} windows",
                predictions.len(),
                rows
            )));
        }

        debug!("{}: forecast {} windows", self.name, rows);
        Ok(predictions)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "onnx"
    }
}
