//! Tabular datasets.
//!
//! A `Frame` is the in-memory table that generated queries execute
//! against: an ordered list of column names plus row-major cell storage.

use crate::Value;

/// An in-memory table with named, ordered columns.
///
/// Invariant: every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Create an empty frame with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a frame from column names and pre-built rows.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All rows, in order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Cell at (row, column), if in bounds.
    pub fn value_at(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |r| r.get(index))
    }

    /// Append a row. The row must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True if the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// New frame containing only the given column positions, in the
    /// given order.
    pub fn select(&self, indices: &[usize]) -> Frame {
        let columns = indices
            .iter()
            .map(|&i| self.columns[i].clone())
            .collect::<Vec<_>>();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Frame { columns, rows }
    }

    /// New frame containing only the rows at the given positions.
    pub fn take_rows(&self, indices: &[usize]) -> Frame {
        let rows = indices.iter().map(|&i| self.rows[i].clone()).collect();
        Frame {
            columns: self.columns.clone(),
            rows,
        }
    }
}
