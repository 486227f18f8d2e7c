//! Query operation implementations.
//!
//! Each operation kind (selection, projection, merge, group-by
//! aggregation) lives in its own module; [`Operation`] is the closed
//! set dispatching the shared apply/render/column-effect contract.

mod group_by;
mod merge;
mod projection;
mod selection;

use std::collections::{BTreeMap, BTreeSet};

use quarry_core::Frame;

use crate::{QueryError, QueryResult};

pub use group_by::{Aggregate, GroupByAggregation};
pub use merge::Merge;
pub use projection::Projection;
pub use selection::Selection;

/// Read-only tables a query chain executes against, keyed by entity
/// name.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    tables: &'a BTreeMap<String, Frame>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(tables: &'a BTreeMap<String, Frame>) -> Self {
        Self { tables }
    }

    /// The sample table of an entity.
    pub fn table(&self, entity: &str) -> QueryResult<&'a Frame> {
        self.tables
            .get(entity)
            .ok_or_else(|| QueryError::unknown_entity(entity))
    }
}

/// Kind tag for an operation, used in statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Selection,
    Projection,
    Merge,
    GroupByAggregation,
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Selection => "selection",
            OperationKind::Projection => "projection",
            OperationKind::Merge => "merge",
            OperationKind::GroupByAggregation => "groupby_aggregation",
        }
    }
}

/// One transformation step in a query chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Selection(Selection),
    Projection(Projection),
    Merge(Merge),
    GroupByAggregation(GroupByAggregation),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Selection(_) => OperationKind::Selection,
            Operation::Projection(_) => OperationKind::Projection,
            Operation::Merge(_) => OperationKind::Merge,
            Operation::GroupByAggregation(_) => OperationKind::GroupByAggregation,
        }
    }

    /// Apply the operation to a frame. Pure: the input frame and the
    /// context tables are never modified.
    pub fn apply(&self, frame: &Frame, ctx: &ExecutionContext<'_>) -> QueryResult<Frame> {
        match self {
            Operation::Selection(op) => op.apply(frame),
            Operation::Projection(op) => op.apply(frame),
            Operation::Merge(op) => op.apply(frame, ctx),
            Operation::GroupByAggregation(op) => op.apply(frame),
        }
    }

    /// Render the operation as a text fragment appended to `source`.
    pub fn render(&self, source: &str) -> String {
        match self {
            Operation::Selection(op) => op.render(source),
            Operation::Projection(op) => op.render(),
            Operation::Merge(op) => op.render(),
            Operation::GroupByAggregation(op) => op.render(),
        }
    }

    /// Columns the operation reads from its input.
    pub fn required_columns(&self) -> Vec<&str> {
        match self {
            Operation::Selection(op) => op.required_columns(),
            Operation::Projection(op) => op.columns().iter().map(String::as_str).collect(),
            Operation::Merge(op) => vec![op.left_on()],
            Operation::GroupByAggregation(op) => op
                .columns()
                .iter()
                .chain(op.value_columns())
                .map(String::as_str)
                .collect(),
        }
    }

    /// The column set available after applying this operation to a
    /// frame with `current` columns. This is the mechanical
    /// column-transform rule the builder tracks.
    pub fn produced_columns(&self, current: &BTreeSet<String>) -> BTreeSet<String> {
        match self {
            Operation::Selection(_) => current.clone(),
            Operation::Projection(op) => op.columns().iter().cloned().collect(),
            Operation::Merge(op) => {
                let mut columns = current.clone();
                columns.extend(op.entity_columns().iter().cloned());
                columns
            }
            Operation::GroupByAggregation(op) => op
                .columns()
                .iter()
                .chain(op.value_columns())
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Condition;
    use quarry_core::{ComparisonOperator, Value};

    fn current() -> BTreeSet<String> {
        ["id", "name", "age"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_selection_keeps_columns() {
        let op = Operation::Selection(Selection::new(
            vec![Condition::new("age", ComparisonOperator::Gt, Value::Int(1))],
            vec![],
        ));
        assert_eq!(op.produced_columns(&current()), current());
    }

    #[test]
    fn test_projection_replaces_columns() {
        let op = Operation::Projection(Projection::new(vec!["name".into()]));
        let produced = op.produced_columns(&current());
        assert_eq!(produced.len(), 1);
        assert!(produced.contains("name"));
    }

    #[test]
    fn test_merge_unions_columns() {
        let op = Operation::Merge(Merge::new(
            "orders",
            "id",
            "customer_id",
            vec!["order_id".into(), "customer_id".into()],
        ));
        let produced = op.produced_columns(&current());
        assert!(produced.contains("order_id"));
        assert!(produced.contains("id"));
        assert_eq!(produced.len(), 5);
    }

    #[test]
    fn test_group_by_replaces_with_keys_and_values() {
        let op = Operation::GroupByAggregation(GroupByAggregation::new(
            vec!["name".into()],
            vec!["age".into()],
            Aggregate::Mean,
        ));
        let produced = op.produced_columns(&current());
        assert_eq!(produced.len(), 2);
        assert!(produced.contains("name"));
        assert!(produced.contains("age"));
    }
}
