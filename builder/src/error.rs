//! Generation-policy error types.

use thiserror::Error;

/// Result type for policy construction.
pub type StructureResult<T> = Result<T, StructureError>;

/// Errors raised when a [`crate::QueryStructure`] carries out-of-range
/// values. These are rejected eagerly, before any generation starts.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("{field} must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("malformed query structure: {message}")]
    Malformed { message: String },
}

impl From<serde_json::Error> for StructureError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed {
            message: e.to_string(),
        }
    }
}
