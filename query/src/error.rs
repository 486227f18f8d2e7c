//! Query execution error types.

use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while applying an operation chain to sample tables.
///
/// These are never fatal for a batch: the pool captures them per query
/// and reports them as statistics, keyed by [`QueryError::kind`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    #[error("unknown entity: {entity}")]
    UnknownEntity { entity: String },

    #[error("cannot compare column {column} ({column_type}) with {literal}")]
    TypeMismatch {
        column: String,
        column_type: &'static str,
        literal: String,
    },
}

impl QueryError {
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        Self::UnknownEntity {
            entity: entity.into(),
        }
    }

    /// Stable error-kind label used as a statistics key.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::UnknownColumn { .. } => "UnknownColumn",
            QueryError::UnknownEntity { .. } => "UnknownEntity",
            QueryError::TypeMismatch { .. } => "TypeMismatch",
        }
    }
}
