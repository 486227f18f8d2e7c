//! Row filtering.

use quarry_core::{Frame, LogicalOperator};

use crate::{Condition, QueryResult};

/// Filters rows by a sequence of conditions combined left-to-right with
/// per-condition AND/OR connectives. The column set is unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    conditions: Vec<Condition>,
    /// Connective applied before each condition after the first;
    /// always one shorter than `conditions`.
    connectives: Vec<LogicalOperator>,
}

impl Selection {
    pub fn new(conditions: Vec<Condition>, connectives: Vec<LogicalOperator>) -> Self {
        debug_assert_eq!(connectives.len(), conditions.len().saturating_sub(1));
        Self {
            conditions,
            connectives,
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn num_conditions(&self) -> usize {
        self.conditions.len()
    }

    /// Columns the conditions read.
    pub fn required_columns(&self) -> Vec<&str> {
        self.conditions.iter().map(|c| c.column.as_str()).collect()
    }

    pub fn apply(&self, frame: &Frame) -> QueryResult<Frame> {
        let mut kept = Vec::new();

        for row in 0..frame.num_rows() {
            let mut verdict = match self.conditions.first() {
                Some(condition) => condition.evaluate(frame, row)?,
                None => true,
            };

            for (condition, connective) in
                self.conditions.iter().skip(1).zip(&self.connectives)
            {
                let outcome = condition.evaluate(frame, row)?;
                verdict = connective.combine(verdict, outcome);
            }

            if verdict {
                kept.push(row);
            }
        }

        Ok(frame.take_rows(&kept))
    }

    /// Render as a bracketed filter, e.g.
    /// `[(customer['age'] >= 25) & (customer['status'] == 'active')]`.
    pub fn render(&self, source: &str) -> String {
        let mut parts = Vec::with_capacity(self.conditions.len() * 2);

        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                parts.push(self.connectives[i - 1].symbol().to_string());
            }
            parts.push(condition.render(source));
        }

        format!("[{}]", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{ComparisonOperator, Value};

    fn frame() -> Frame {
        Frame::from_rows(
            vec!["age".into(), "country".into()],
            vec![
                vec![Value::Int(25), Value::Str("US".into())],
                vec![Value::Int(30), Value::Str("UK".into())],
                vec![Value::Int(35), Value::Str("US".into())],
            ],
        )
    }

    #[test]
    fn test_single_condition() {
        let selection = Selection::new(
            vec![Condition::new("age", ComparisonOperator::Ge, Value::Int(30))],
            vec![],
        );

        let result = selection.apply(&frame()).unwrap();
        assert_eq!(result.num_rows(), 2);
    }

    #[test]
    fn test_left_to_right_combination() {
        // age >= 30 & country == 'US'
        let selection = Selection::new(
            vec![
                Condition::new("age", ComparisonOperator::Ge, Value::Int(30)),
                Condition::new("country", ComparisonOperator::Eq, Value::Str("US".into())),
            ],
            vec![LogicalOperator::And],
        );

        let result = selection.apply(&frame()).unwrap();
        assert_eq!(result.num_rows(), 1);
        assert_eq!(result.value_at(0, 0), Some(&Value::Int(35)));
    }

    #[test]
    fn test_or_keeps_either_side() {
        let selection = Selection::new(
            vec![
                Condition::new("age", ComparisonOperator::Lt, Value::Int(30)),
                Condition::new("country", ComparisonOperator::Eq, Value::Str("UK".into())),
            ],
            vec![LogicalOperator::Or],
        );

        let result = selection.apply(&frame()).unwrap();
        assert_eq!(result.num_rows(), 2);
    }

    #[test]
    fn test_column_set_unchanged() {
        let selection = Selection::new(
            vec![Condition::new("age", ComparisonOperator::Gt, Value::Int(100))],
            vec![],
        );

        let result = selection.apply(&frame()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns(), frame().columns());
    }

    #[test]
    fn test_render_multiple_conditions() {
        let selection = Selection::new(
            vec![
                Condition::new("age", ComparisonOperator::Ge, Value::Int(25)),
                Condition::new("country", ComparisonOperator::Eq, Value::Str("US".into())),
            ],
            vec![LogicalOperator::And],
        );

        assert_eq!(
            selection.render("customer"),
            "[(customer['age'] >= 25) & (customer['country'] == 'US')]"
        );
    }
}
