//! Joins against related sample tables.

use std::collections::HashMap;

use quarry_core::Frame;

use crate::ops::ExecutionContext;
use crate::{QueryError, QueryResult};

/// Inner-joins the current frame with the sample table of a related
/// entity on `left_on`/`right_on`.
///
/// The result column set is the union of both sides: the left frame's
/// columns followed by the joined entity's columns that are not already
/// present. The joined entity's column list is recorded at construction
/// so the column effect can be replayed without schema access.
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    entity: String,
    left_on: String,
    right_on: String,
    entity_columns: Vec<String>,
}

impl Merge {
    pub fn new(
        entity: impl Into<String>,
        left_on: impl Into<String>,
        right_on: impl Into<String>,
        entity_columns: Vec<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            left_on: left_on.into(),
            right_on: right_on.into(),
            entity_columns,
        }
    }

    /// Name of the joined entity.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn left_on(&self) -> &str {
        &self.left_on
    }

    pub fn right_on(&self) -> &str {
        &self.right_on
    }

    /// Columns of the joined entity, in declaration order.
    pub fn entity_columns(&self) -> &[String] {
        &self.entity_columns
    }

    pub fn apply(&self, frame: &Frame, ctx: &ExecutionContext<'_>) -> QueryResult<Frame> {
        let right = ctx.table(&self.entity)?;

        let left_key = frame
            .column_index(&self.left_on)
            .ok_or_else(|| QueryError::unknown_column(&self.left_on))?;
        let right_key = right
            .column_index(&self.right_on)
            .ok_or_else(|| QueryError::unknown_column(&self.right_on))?;

        // Right columns not already present on the left are appended.
        let kept_right: Vec<usize> = (0..right.num_columns())
            .filter(|&i| frame.column_index(&right.columns()[i]).is_none())
            .collect();

        let mut columns = frame.columns().to_vec();
        columns.extend(kept_right.iter().map(|&i| right.columns()[i].clone()));

        // Hash join: index right rows by key, probe with left rows.
        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        for (row, key) in right.column_values(right_key).enumerate() {
            by_key.entry(key.to_string()).or_default().push(row);
        }

        let mut result = Frame::new(columns);

        for left_row in frame.rows() {
            let key = left_row[left_key].to_string();

            for &right_index in by_key.get(&key).map(Vec::as_slice).unwrap_or(&[]) {
                let mut row = left_row.clone();
                for &i in &kept_right {
                    row.push(right.rows()[right_index][i].clone());
                }
                result.push_row(row);
            }
        }

        Ok(result)
    }

    /// Render as a merge call, e.g.
    /// `.merge(customer, left_on='O_CUSTKEY', right_on='C_CUSTKEY')`.
    pub fn render(&self) -> String {
        format!(
            ".merge({}, left_on='{}', right_on='{}')",
            self.entity, self.left_on, self.right_on
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::Value;
    use std::collections::BTreeMap;

    fn tables() -> BTreeMap<String, Frame> {
        let mut tables = BTreeMap::new();
        tables.insert(
            "customer".to_string(),
            Frame::from_rows(
                vec!["C_CUSTKEY".into(), "C_NAME".into()],
                vec![
                    vec![Value::Int(1), Value::Str("Alice".into())],
                    vec![Value::Int(2), Value::Str("Bob".into())],
                ],
            ),
        );
        tables
    }

    fn orders() -> Frame {
        Frame::from_rows(
            vec!["O_ORDERKEY".into(), "O_CUSTKEY".into()],
            vec![
                vec![Value::Int(10), Value::Int(1)],
                vec![Value::Int(11), Value::Int(1)],
                vec![Value::Int(12), Value::Int(3)],
            ],
        )
    }

    fn merge() -> Merge {
        Merge::new(
            "customer",
            "O_CUSTKEY",
            "C_CUSTKEY",
            vec!["C_CUSTKEY".into(), "C_NAME".into()],
        )
    }

    #[test]
    fn test_inner_join() {
        let tables = tables();
        let ctx = ExecutionContext::new(&tables);

        let result = merge().apply(&orders(), &ctx).unwrap();

        // Orders 10 and 11 match customer 1; order 12 has no match.
        assert_eq!(result.num_rows(), 2);
        assert_eq!(
            result.columns(),
            &[
                "O_ORDERKEY".to_string(),
                "O_CUSTKEY".to_string(),
                "C_CUSTKEY".to_string(),
                "C_NAME".to_string(),
            ]
        );
        assert_eq!(result.value_at(0, 3), Some(&Value::Str("Alice".into())));
    }

    #[test]
    fn test_duplicate_column_names_collapse() {
        let mut tables = tables();
        tables.insert(
            "address".to_string(),
            Frame::from_rows(
                vec!["C_CUSTKEY".into(), "CITY".into()],
                vec![vec![Value::Int(1), Value::Str("Oslo".into())]],
            ),
        );
        let ctx = ExecutionContext::new(&tables);

        let left = Frame::from_rows(
            vec!["C_CUSTKEY".into(), "C_NAME".into()],
            vec![vec![Value::Int(1), Value::Str("Alice".into())]],
        );

        let merge = Merge::new(
            "address",
            "C_CUSTKEY",
            "C_CUSTKEY",
            vec!["C_CUSTKEY".into(), "CITY".into()],
        );
        let result = merge.apply(&left, &ctx).unwrap();

        // The shared key column appears once.
        assert_eq!(
            result.columns(),
            &[
                "C_CUSTKEY".to_string(),
                "C_NAME".to_string(),
                "CITY".to_string(),
            ]
        );
    }

    #[test]
    fn test_unknown_entity() {
        let tables = BTreeMap::new();
        let ctx = ExecutionContext::new(&tables);

        let err = merge().apply(&orders(), &ctx).unwrap_err();
        assert_eq!(err.kind(), "UnknownEntity");
    }

    #[test]
    fn test_render() {
        assert_eq!(
            merge().render(),
            ".merge(customer, left_on='O_CUSTKEY', right_on='C_CUSTKEY')"
        );
    }
}
