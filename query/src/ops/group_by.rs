//! Group-by aggregation.

use std::collections::HashMap;

use quarry_core::{Frame, Value};

use crate::{QueryError, QueryResult};

/// An aggregation function applied to each group's value columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Sum,
    Mean,
    Count,
    Min,
    Max,
}

impl Aggregate {
    /// The function's name in the rendered query grammar.
    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::Sum => "sum",
            Aggregate::Mean => "mean",
            Aggregate::Count => "count",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
        }
    }

    pub const ALL: [Aggregate; 5] = [
        Aggregate::Sum,
        Aggregate::Mean,
        Aggregate::Count,
        Aggregate::Min,
        Aggregate::Max,
    ];

    /// Aggregate one group's values for a single column. `values` is
    /// never empty: a group exists only because at least one row
    /// produced it.
    fn compute(&self, values: &[&Value]) -> Value {
        match self {
            Aggregate::Count => Value::Int(values.len() as i64),
            Aggregate::Sum => {
                // Integer sums stay integers until a float appears.
                let mut int_sum = 0i64;
                let mut float_sum = 0.0f64;
                let mut has_float = false;
                for value in values {
                    match value {
                        Value::Int(i) if !has_float => int_sum += i,
                        other => {
                            if !has_float {
                                float_sum = int_sum as f64;
                                has_float = true;
                            }
                            float_sum += other.as_float().unwrap_or(0.0);
                        }
                    }
                }
                if has_float {
                    Value::Float(float_sum)
                } else {
                    Value::Int(int_sum)
                }
            }
            Aggregate::Mean => {
                let sum: f64 = values.iter().filter_map(|v| v.as_float()).sum();
                Value::Float(sum / values.len() as f64)
            }
            Aggregate::Min => values
                .iter()
                .min_by(|a, b| a.cmp_sortable(b))
                .map(|v| (*v).clone())
                .unwrap_or(Value::Int(0)),
            Aggregate::Max => values
                .iter()
                .max_by(|a, b| a.cmp_sortable(b))
                .map(|v| (*v).clone())
                .unwrap_or(Value::Int(0)),
        }
    }
}

/// Groups rows by a non-empty key column set and aggregates the
/// remaining numeric columns with one function.
///
/// The result has one row per distinct key combination (sorted by key)
/// and its columns are the keys followed by the aggregated value
/// columns. Because row-level identity is gone afterwards, this is
/// always the last operation of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByAggregation {
    columns: Vec<String>,
    value_columns: Vec<String>,
    aggregate: Aggregate,
}

impl GroupByAggregation {
    pub fn new(columns: Vec<String>, value_columns: Vec<String>, aggregate: Aggregate) -> Self {
        debug_assert!(!columns.is_empty());
        Self {
            columns,
            value_columns,
            aggregate,
        }
    }

    /// Grouping key columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Aggregated value columns (the numeric columns outside the key).
    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    pub fn aggregate(&self) -> Aggregate {
        self.aggregate
    }

    pub fn apply(&self, frame: &Frame) -> QueryResult<Frame> {
        let key_indices = self.resolve(frame, &self.columns)?;
        let value_indices = self.resolve(frame, &self.value_columns)?;

        // Bucket row indices per distinct key, then sort groups by key
        // values for deterministic output.
        let mut groups: Vec<(Vec<Value>, Vec<usize>)> = Vec::new();
        let mut lookup: HashMap<String, usize> = HashMap::new();

        for (row_index, row) in frame.rows().iter().enumerate() {
            let key: Vec<Value> = key_indices.iter().map(|&i| row[i].clone()).collect();
            let tag = key
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join("\u{1f}");

            match lookup.get(&tag) {
                Some(&slot) => groups[slot].1.push(row_index),
                None => {
                    lookup.insert(tag, groups.len());
                    groups.push((key, vec![row_index]));
                }
            }
        }

        groups.sort_by(|(a, _), (b, _)| {
            a.iter()
                .zip(b)
                .map(|(x, y)| x.cmp_sortable(y))
                .find(|o| !o.is_eq())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut columns = self.columns.clone();
        columns.extend(self.value_columns.iter().cloned());

        let mut result = Frame::new(columns);

        for (key, rows) in groups {
            let mut out = key;
            for &value_index in &value_indices {
                let values: Vec<&Value> = rows
                    .iter()
                    .filter_map(|&r| frame.value_at(r, value_index))
                    .collect();
                out.push(self.aggregate.compute(&values));
            }
            result.push_row(out);
        }

        Ok(result)
    }

    fn resolve(&self, frame: &Frame, names: &[String]) -> QueryResult<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                frame
                    .column_index(name)
                    .ok_or_else(|| QueryError::unknown_column(name))
            })
            .collect()
    }

    /// Render as a groupby call, e.g.
    /// `.groupby(by=['country']).agg('mean', numeric_only=True)`.
    pub fn render(&self) -> String {
        let keys = self
            .columns
            .iter()
            .map(|c| format!("'{c}'"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            ".groupby(by=[{keys}]).agg('{}', numeric_only=True)",
            self.aggregate.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::from_rows(
            vec!["country".into(), "amount".into()],
            vec![
                vec![Value::Str("US".into()), Value::Int(100)],
                vec![Value::Str("UK".into()), Value::Int(150)],
                vec![Value::Str("US".into()), Value::Int(300)],
            ],
        )
    }

    fn group_by(aggregate: Aggregate) -> GroupByAggregation {
        GroupByAggregation::new(
            vec!["country".into()],
            vec!["amount".into()],
            aggregate,
        )
    }

    #[test]
    fn test_sum_per_group() {
        let result = group_by(Aggregate::Sum).apply(&frame()).unwrap();

        // Groups come out sorted by key: UK before US.
        assert_eq!(result.num_rows(), 2);
        assert_eq!(result.value_at(0, 0), Some(&Value::Str("UK".into())));
        assert_eq!(result.value_at(0, 1), Some(&Value::Int(150)));
        assert_eq!(result.value_at(1, 0), Some(&Value::Str("US".into())));
        assert_eq!(result.value_at(1, 1), Some(&Value::Int(400)));
    }

    #[test]
    fn test_mean_is_float() {
        let result = group_by(Aggregate::Mean).apply(&frame()).unwrap();
        assert_eq!(result.value_at(1, 1), Some(&Value::Float(200.0)));
    }

    #[test]
    fn test_count_rows_per_group() {
        let result = group_by(Aggregate::Count).apply(&frame()).unwrap();
        assert_eq!(result.value_at(0, 1), Some(&Value::Int(1)));
        assert_eq!(result.value_at(1, 1), Some(&Value::Int(2)));
    }

    #[test]
    fn test_min_max() {
        let min = group_by(Aggregate::Min).apply(&frame()).unwrap();
        assert_eq!(min.value_at(1, 1), Some(&Value::Int(100)));

        let max = group_by(Aggregate::Max).apply(&frame()).unwrap();
        assert_eq!(max.value_at(1, 1), Some(&Value::Int(300)));
    }

    #[test]
    fn test_no_value_columns_yields_distinct_keys() {
        let group_by =
            GroupByAggregation::new(vec!["country".into()], vec![], Aggregate::Sum);
        let result = group_by.apply(&frame()).unwrap();

        assert_eq!(result.columns(), &["country".to_string()]);
        assert_eq!(result.num_rows(), 2);
    }

    #[test]
    fn test_render() {
        assert_eq!(
            group_by(Aggregate::Mean).render(),
            ".groupby(by=['country']).agg('mean', numeric_only=True)"
        );
    }
}
