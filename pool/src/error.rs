//! Pool error types.

use thiserror::Error;

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors raised by pool bookkeeping. Query execution failures are not
/// errors at this level; they are captured outcomes.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool has not been executed; call execute() before filtering")]
    NotExecuted,

    #[error("failed to persist pool: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize statistics: {0}")]
    Json(#[from] serde_json::Error),
}
