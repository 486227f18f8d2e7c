//! Column narrowing.

use quarry_core::Frame;

use crate::{QueryError, QueryResult};

/// Narrows the column set to exactly the given columns, in the given
/// order. The column list is strictly non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    columns: Vec<String>,
}

impl Projection {
    pub fn new(columns: Vec<String>) -> Self {
        debug_assert!(!columns.is_empty());
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn apply(&self, frame: &Frame) -> QueryResult<Frame> {
        let indices = self
            .columns
            .iter()
            .map(|name| {
                frame
                    .column_index(name)
                    .ok_or_else(|| QueryError::unknown_column(name))
            })
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(frame.select(&indices))
    }

    /// Render as a double-bracketed column list, e.g. `[['name', 'age']]`.
    pub fn render(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("'{c}'"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("[[{columns}]]")
    }
}
