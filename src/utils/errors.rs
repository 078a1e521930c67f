//! Error types for tiling-coverage selection.
//!
//! Every error here is fatal for the operator being compiled: an operator
//! either gets a fully covering set of tiling cases or no result at all.

use crate::geometry::Rect;
use thiserror::Error;

/// Top-level error type for the tiling pipeline.
#[derive(Error, Debug)]
pub enum TilingError {
    /// The symbolic-dimension pattern of the shape matches neither the
    /// spatial (H/W) mode nor the batch mode.
    #[error("Unsupported dynamic pattern: {0}")]
    UnsupportedPattern(String),

    /// A synthesized plan's coverage window misses the rectangle it was
    /// synthesized for.
    #[error("Synthesized plan does not cover {rect}: window {window}")]
    SynthesisInconsistency {
        /// The uncovered rectangle handed to the oracle
        rect: Rect,
        /// The window computed for the synthesized plan
        window: Rect,
    },

    /// The synthesis oracle itself failed.
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// A dimension range with `min > max` or non-positive bounds.
    #[error("Invalid range for {dim}: [{min}, {max}]")]
    InvalidRange {
        /// Name of the offending dimension
        dim: String,
        /// Lower bound as given
        min: i64,
        /// Upper bound as given
        max: i64,
    },

    /// Seed repository could not be read.
    #[error("Seed repository error: {0}")]
    Repository(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TilingError {
    /// Create a synthesis failure from anything printable.
    pub fn synthesis(message: impl Into<String>) -> Self {
        TilingError::Synthesis(message.into())
    }

    /// Whether this error originates in an external oracle rather than in
    /// the shape metadata handed to the driver.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            TilingError::SynthesisInconsistency { .. } | TilingError::Synthesis(_)
        )
    }
}

/// Result type using TilingError.
pub type TilingResult<T> = Result<T, TilingError>;
