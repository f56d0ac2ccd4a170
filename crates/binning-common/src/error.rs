//! Error types for tile addressing and bin access.

use thiserror::Error;

/// Result type alias using BinningError.
pub type BinningResult<T> = Result<T, BinningError>;

/// Errors raised while addressing tiles or reading bins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinningError {
    /// A bin coordinate fell outside the tile's grid.
    #[error("bin ({x}, {y}) is outside of the tile's {x_bins}x{y_bins} bin range")]
    OutOfRange {
        x: usize,
        y: usize,
        x_bins: usize,
        y_bins: usize,
    },

    /// Two tile indices are not in the required pyramid relationship.
    #[error("invalid tile relation: {0}")]
    InvalidRelation(String),

    /// A tile index or bin buffer is malformed.
    #[error("invalid tile index: {0}")]
    InvalidIndex(String),
}

impl BinningError {
    /// Create an OutOfRange error.
    pub fn out_of_range(x: usize, y: usize, x_bins: usize, y_bins: usize) -> Self {
        Self::OutOfRange {
            x,
            y,
            x_bins,
            y_bins,
        }
    }

    /// Create an InvalidRelation error.
    pub fn invalid_relation(msg: impl Into<String>) -> Self {
        Self::InvalidRelation(msg.into())
    }

    /// Create an InvalidIndex error.
    pub fn invalid_index(msg: impl Into<String>) -> Self {
        Self::InvalidIndex(msg.into())
    }
}
