//! Error types for Screentime Lens

use thiserror::Error;

/// Errors raised at the controller and configuration boundaries.
///
/// None of these are fatal: the engine reports a rejected input as an effect
/// and keeps its state unchanged.
#[derive(Debug, Error)]
pub enum LensError {
    #[error("Hours value out of range: {0}")]
    InvalidHours(f64),

    #[error("Age {age} must be greater than 0 and less than {life_expectancy}")]
    InvalidAge { age: i64, life_expectancy: f64 },

    #[error("Not a number: {0:?}")]
    NonNumeric(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

impl LensError {
    /// Short machine-readable code used in rejection effects and CLI output
    pub fn code(&self) -> &'static str {
        match self {
            LensError::InvalidHours(_) => "invalid_hours",
            LensError::InvalidAge { .. } => "invalid_age",
            LensError::NonNumeric(_) => "non_numeric",
            LensError::InvalidConfig(_) => "invalid_config",
            LensError::JsonError(_) => "json_error",
            LensError::EncodingError(_) => "encoding_error",
        }
    }
}
