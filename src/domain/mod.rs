// Price history
pub mod market;

// Scaling and windowing for model input
pub mod ml;

// Port interfaces
pub mod ports;

// Trade recommendation
pub mod trading;

// Provider row checks
pub mod validation;

// Domain-specific error types
pub mod errors;
