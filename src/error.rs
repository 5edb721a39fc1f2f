//! Error types for reel-insight

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Length mismatch: x has {x_len} values, y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Insufficient data: need at least {needed} values, got {actual}")]
    InsufficientData { needed: usize, actual: usize },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Failed to parse payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Counter overflow: {0}")]
    CounterOverflow(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
