//! Selection conditions.

use quarry_core::{ComparisonOperator, Frame, Value};

use crate::{QueryError, QueryResult};

/// One predicate of a selection: `column <operator> literal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: ComparisonOperator,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, operator: ComparisonOperator, value: Value) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }

    /// Evaluate the predicate against one row of `frame`.
    pub fn evaluate(&self, frame: &Frame, row: usize) -> QueryResult<bool> {
        let index = frame
            .column_index(&self.column)
            .ok_or_else(|| QueryError::unknown_column(&self.column))?;

        let cell = frame
            .value_at(row, index)
            .ok_or_else(|| QueryError::unknown_column(&self.column))?;

        self.operator
            .evaluate(cell, &self.value)
            .ok_or_else(|| QueryError::TypeMismatch {
                column: self.column.clone(),
                column_type: cell.type_name(),
                literal: self.value.to_string(),
            })
    }

    /// Render the predicate as a parenthesized fragment, e.g.
    /// `(orders['O_TOTAL'] >= 100)` or
    /// `(customer['C_NAME'].str.contains('C'))`.
    pub fn render(&self, source: &str) -> String {
        match self.operator {
            ComparisonOperator::Contains => format!(
                "({source}['{}'].str.contains({}))",
                self.column, self.value
            ),
            _ => format!(
                "({source}['{}'] {} {})",
                self.column,
                self.operator.symbol(),
                self.value
            ),
        }
    }
}
