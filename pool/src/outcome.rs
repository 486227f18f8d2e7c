//! Per-query execution outcomes.

use quarry_core::Frame;
use quarry_query::{QueryError, QueryResult};

/// The recorded result of executing one query against the sample
/// tables: either the produced frame or the captured error.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Execution succeeded; the frame may be empty.
    Success(Frame),
    /// Execution raised; the error is kept as kind + message so
    /// statistics can bucket by kind.
    Error { kind: String, message: String },
}

impl QueryOutcome {
    /// Returns true if execution succeeded with zero rows.
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryOutcome::Success(frame) if frame.is_empty())
    }

    /// Returns true if execution succeeded with at least one row.
    pub fn is_non_empty(&self) -> bool {
        matches!(self, QueryOutcome::Success(frame) if !frame.is_empty())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryOutcome::Error { .. })
    }

    /// The produced frame, if execution succeeded.
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            QueryOutcome::Success(frame) => Some(frame),
            QueryOutcome::Error { .. } => None,
        }
    }

    /// The error kind, if execution raised.
    pub fn error_kind(&self) -> Option<&str> {
        match self {
            QueryOutcome::Error { kind, .. } => Some(kind),
            QueryOutcome::Success(_) => None,
        }
    }
}

impl From<QueryResult<Frame>> for QueryOutcome {
    fn from(result: QueryResult<Frame>) -> Self {
        match result {
            Ok(frame) => QueryOutcome::Success(frame),
            Err(error) => QueryOutcome::from(error),
        }
    }
}

impl From<QueryError> for QueryOutcome {
    fn from(error: QueryError) -> Self {
        QueryOutcome::Error {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}
