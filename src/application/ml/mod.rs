pub mod onnx_predictor;
pub mod predictor;

pub use onnx_predictor::OnnxForecaster;
pub use predictor::Forecaster;
