//! Error types for the annotation layer.

use binning_common::BinningError;
use thiserror::Error;

/// Result type alias using AnnotationError.
pub type AnnotationResult<T> = Result<T, AnnotationError>;

/// Errors raised by annotation filters and stores.
#[derive(Debug, Error)]
pub enum AnnotationError {
    /// Filter configuration could not be parsed.
    #[error("invalid filter configuration: {0}")]
    InvalidConfig(String),

    /// The requested annotation layer does not exist.
    #[error("annotation layer not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Binning(#[from] BinningError),
}

impl AnnotationError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

impl From<std::io::Error> for AnnotationError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AnnotationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
