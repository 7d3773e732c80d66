//! Error types for neuroscreen
//!
//! Model-path errors (`ModelUnavailable`, `ShapeError`, `InferenceRuntime`)
//! are absorbed at the model adapter boundary and routed to the fallback
//! scorer. The remaining variants surface from configuration, persistence
//! and acquisition helpers.

use thiserror::Error;

/// Main error type for the screening pipeline
#[derive(Error, Debug)]
pub enum ScreeningError {
    /// Model artifact missing, unreadable or corrupt
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Unsupported tensor rank or irreconcilable geometry
    #[error("Shape error for tensor {shape}: {reason}")]
    ShapeError { shape: String, reason: String },

    /// Failure while executing the model
    #[error("Inference runtime error: {0}")]
    InferenceRuntime(String),

    /// Rejected user or sensor input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Timeout errors
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic errors with context
    #[error("Screening error: {0}")]
    Generic(String),
}

impl ScreeningError {
    /// Build a shape error from any displayable shape
    pub fn shape(shape: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        ScreeningError::ShapeError {
            shape: shape.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error belongs to the model path and should route to the fallback scorer
    pub fn is_model_path(&self) -> bool {
        matches!(
            self,
            ScreeningError::ModelUnavailable(_)
                | ScreeningError::ShapeError { .. }
                | ScreeningError::InferenceRuntime(_)
        )
    }
}

/// Result type alias for screening operations
pub type Result<T> = std::result::Result<T, ScreeningError>;

/// Convert anyhow errors to ScreeningError
impl From<anyhow::Error> for ScreeningError {
    fn from(err: anyhow::Error) -> Self {
        ScreeningError::Generic(format!("{:#}", err))
    }
}

/// Tensor failures raised by candle happen during model execution
impl From<candle_core::Error> for ScreeningError {
    fn from(err: candle_core::Error) -> Self {
        ScreeningError::InferenceRuntime(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScreeningError::Timeout { duration_ms: 250 };
        assert!(err.to_string().contains("250"));
    }

    #[test]
    fn test_shape_error_display() {
        let err = ScreeningError::shape("[1, 2, 3, 4, 5]", "rank 5 is not supported");
        let text = err.to_string();
        assert!(text.contains("[1, 2, 3, 4, 5]"));
        assert!(text.contains("rank 5"));
    }

    #[test]
    fn test_model_path_classification() {
        assert!(ScreeningError::ModelUnavailable("missing".into()).is_model_path());
        assert!(ScreeningError::InferenceRuntime("boom".into()).is_model_path());
        assert!(ScreeningError::shape("[3]", "rank 1").is_model_path());
        assert!(!ScreeningError::InvalidInput("glucose".into()).is_model_path());
        assert!(!ScreeningError::Timeout { duration_ms: 1 }.is_model_path());
    }

    #[test]
    fn test_anyhow_conversion_keeps_context() {
        let err: ScreeningError = anyhow::anyhow!("disk full")
            .context("Failed to write record")
            .into();
        let text = err.to_string();
        assert!(text.contains("Failed to write record"));
        assert!(text.contains("disk full"));
    }
}
