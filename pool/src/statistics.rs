//! Pool statistics.
//!
//! The statistics record is the pool's reporting surface: execution
//! totals, per-error-kind counts, per-query operation size sequences
//! (aligned with query order) and the policy the queries were built
//! with, so requested probabilities can be compared against observed
//! frequencies.

use std::collections::BTreeMap;
use std::fmt;

use quarry_builder::QueryStructure;
use quarry_query::{Operation, OperationKind};
use serde::Serialize;

use crate::QueryPool;

/// Execution outcome totals. All zero until the pool has executed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionStatistics {
    /// Whether the pool has executed at all.
    pub executed: bool,
    pub successful: usize,
    pub failed: usize,
    pub non_empty: usize,
    pub empty: usize,
    /// Successful executions as a percentage of the pool.
    pub success_rate: f64,
    /// Non-empty results as a percentage of the pool.
    pub non_empty_rate: f64,
}

/// Aggregate statistics for one pool.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_queries: usize,
    pub avg_operations_per_query: f64,
    /// Per query, the number of selection conditions (0 without a
    /// selection). Aligned with pool order; likewise below.
    pub selection_conditions: Vec<usize>,
    /// Per query, the number of projected columns.
    pub projection_columns: Vec<usize>,
    /// Per query, the number of group-by key columns.
    pub groupby_columns: Vec<usize>,
    /// Per query, the number of merges.
    pub merge_counts: Vec<usize>,
    /// Number of queries containing each operation kind.
    pub queries_with_operation: BTreeMap<String, usize>,
    /// Number of queries starting from each entity.
    pub entities_used: BTreeMap<String, usize>,
    /// Captured execution errors bucketed by error kind.
    pub errors: BTreeMap<String, usize>,
    pub execution: ExecutionStatistics,
    /// The policy the queries were generated with.
    pub query_structure: QueryStructure,
}

impl Statistics {
    pub(crate) fn gather(pool: &QueryPool) -> Self {
        let total_queries = pool.len();
        let mut total_operations = 0usize;

        let mut selection_conditions = Vec::with_capacity(total_queries);
        let mut projection_columns = Vec::with_capacity(total_queries);
        let mut groupby_columns = Vec::with_capacity(total_queries);
        let mut merge_counts = Vec::with_capacity(total_queries);
        let mut queries_with_operation: BTreeMap<String, usize> = BTreeMap::new();
        let mut entities_used: BTreeMap<String, usize> = BTreeMap::new();

        for query in pool.queries() {
            total_operations += query.operations().len();
            *entities_used.entry(query.entity().to_string()).or_insert(0) += 1;

            let mut conditions = 0;
            let mut projected = 0;
            let mut keys = 0;

            for op in query.operations() {
                match op {
                    Operation::Selection(s) => conditions += s.num_conditions(),
                    Operation::Projection(p) => projected += p.num_columns(),
                    Operation::GroupByAggregation(g) => keys += g.num_columns(),
                    Operation::Merge(_) => {}
                }
            }

            selection_conditions.push(conditions);
            projection_columns.push(projected);
            groupby_columns.push(keys);
            merge_counts.push(query.merge_count());

            for kind in [
                OperationKind::Selection,
                OperationKind::Projection,
                OperationKind::Merge,
                OperationKind::GroupByAggregation,
            ] {
                if query.contains(kind) {
                    *queries_with_operation
                        .entry(kind.name().to_string())
                        .or_insert(0) += 1;
                }
            }
        }

        let mut execution = ExecutionStatistics {
            executed: pool.with_status(),
            ..Default::default()
        };
        let mut errors: BTreeMap<String, usize> = BTreeMap::new();

        for (_, outcome) in pool.items() {
            let Some(outcome) = outcome else { continue };

            if let Some(kind) = outcome.error_kind() {
                execution.failed += 1;
                *errors.entry(kind.to_string()).or_insert(0) += 1;
            } else {
                execution.successful += 1;
                if outcome.is_empty() {
                    execution.empty += 1;
                } else {
                    execution.non_empty += 1;
                }
            }
        }

        if total_queries > 0 {
            execution.success_rate = execution.successful as f64 / total_queries as f64 * 100.0;
            execution.non_empty_rate = execution.non_empty as f64 / total_queries as f64 * 100.0;
        }

        let avg_operations_per_query = if total_queries > 0 {
            total_operations as f64 / total_queries as f64
        } else {
            0.0
        };

        Statistics {
            total_queries,
            avg_operations_per_query,
            selection_conditions,
            projection_columns,
            groupby_columns,
            merge_counts,
            queries_with_operation,
            entities_used,
            errors,
            execution,
            query_structure: pool.structure().clone(),
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total queries generated: {}", self.total_queries)?;
        writeln!(
            f,
            "Average operations per query: {:.2}",
            self.avg_operations_per_query
        )?;

        writeln!(f)?;
        writeln!(f, "Queries containing each operation:")?;
        for (kind, count) in &self.queries_with_operation {
            let percentage = count_percentage(*count, self.total_queries);
            writeln!(f, "  {kind}: {count} ({percentage:.2}%)")?;
        }

        writeln!(f)?;
        writeln!(f, "Entity usage:")?;
        for (entity, count) in &self.entities_used {
            let percentage = count_percentage(*count, self.total_queries);
            writeln!(f, "  {entity}: {count} ({percentage:.2}%)")?;
        }

        if self.execution.executed {
            writeln!(f)?;
            writeln!(f, "Execution results:")?;
            writeln!(
                f,
                "  Successful: {} ({:.2}%)",
                self.execution.successful, self.execution.success_rate
            )?;
            writeln!(f, "  Failed: {}", self.execution.failed)?;
            writeln!(
                f,
                "  Non-empty results: {} ({:.2}%)",
                self.execution.non_empty, self.execution.non_empty_rate
            )?;
            writeln!(f, "  Empty results: {}", self.execution.empty)?;

            if !self.errors.is_empty() {
                writeln!(f)?;
                writeln!(f, "Errors by kind:")?;
                for (kind, count) in &self.errors {
                    writeln!(f, "  {kind}: {count}")?;
                }
            }
        }

        Ok(())
    }
}

fn count_percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::{ComparisonOperator, Frame, Value};
    use quarry_query::{Condition, Merge, Query, Selection};
    use std::collections::{BTreeMap as Map, BTreeSet};

    fn tables() -> Map<String, Frame> {
        let mut tables = Map::new();
        tables.insert(
            "t".to_string(),
            Frame::from_rows(
                vec!["a".into(), "b".into()],
                vec![vec![Value::Int(1), Value::Int(2)]],
            ),
        );
        tables.insert(
            "u".to_string(),
            Frame::from_rows(vec!["a".into()], vec![vec![Value::Int(1)]]),
        );
        tables
    }

    fn queries() -> Vec<Query> {
        let selection = Operation::Selection(Selection::new(
            vec![
                Condition::new("a", ComparisonOperator::Ge, Value::Int(0)),
                Condition::new("b", ComparisonOperator::Lt, Value::Int(10)),
            ],
            vec![quarry_core::LogicalOperator::And],
        ));
        let merge = Operation::Merge(Merge::new("u", "a", "a", vec!["a".into()]));

        vec![
            Query::new("t", vec![selection], BTreeSet::new(), false),
            Query::new("t", vec![merge], BTreeSet::new(), false),
            Query::new("t", vec![], BTreeSet::new(), false),
        ]
    }

    #[test]
    fn test_sequences_align_with_query_order() {
        let pool = QueryPool::new(queries(), QueryStructure::default(), tables());
        let stats = pool.statistics();

        assert_eq!(stats.total_queries, 3);
        assert_eq!(stats.selection_conditions, vec![2, 0, 0]);
        assert_eq!(stats.merge_counts, vec![0, 1, 0]);
        assert_eq!(stats.queries_with_operation.get("selection"), Some(&1));
        assert_eq!(stats.queries_with_operation.get("merge"), Some(&1));
        assert_eq!(stats.entities_used.get("t"), Some(&3));
        assert!(!stats.execution.executed);
    }

    #[test]
    fn test_execution_totals() {
        let mut pool = QueryPool::new(queries(), QueryStructure::default(), tables());
        pool.execute(false);
        let stats = pool.statistics();

        assert!(stats.execution.executed);
        assert_eq!(stats.execution.successful, 3);
        assert_eq!(stats.execution.failed, 0);
        assert_eq!(
            stats.execution.non_empty + stats.execution.empty,
            stats.execution.successful
        );
    }

    #[test]
    fn test_structure_echoed() {
        let structure = QueryStructure::default().with_max_merges(7);
        let pool = QueryPool::new(vec![], structure.clone(), tables());
        assert_eq!(pool.statistics().query_structure, structure);
    }

    #[test]
    fn test_serializes_to_json() {
        let pool = QueryPool::new(queries(), QueryStructure::default(), tables());
        let json = serde_json::to_string(&pool.statistics()).unwrap();
        assert!(json.contains("\"total_queries\":3"));
    }
}
