// Request pipeline
pub mod forecast;

// Model adapters
pub mod ml;

// Wiring and server lifecycle
pub mod system;
