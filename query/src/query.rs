//! The generated query record.

use std::collections::BTreeSet;
use std::fmt;

use quarry_core::Frame;

use crate::ops::{ExecutionContext, Operation, OperationKind};
use crate::QueryResult;

/// Complexity surcharge of a merge relative to the other operations:
/// a join touches a second table.
const MERGE_WEIGHT: usize = 3;

/// An immutable record of one generated query: the entity the chain
/// begins from plus an ordered operation chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    entity: String,
    operations: Vec<Operation>,
    available_columns: BTreeSet<String>,
    multi_line: bool,
}

impl Query {
    pub fn new(
        entity: impl Into<String>,
        operations: Vec<Operation>,
        available_columns: BTreeSet<String>,
        multi_line: bool,
    ) -> Self {
        Self {
            entity: entity.into(),
            operations,
            available_columns,
            multi_line,
        }
    }

    /// The entity the chain begins from.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Operations in application order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Columns visible at the end of the chain.
    pub fn available_columns(&self) -> &BTreeSet<String> {
        &self.available_columns
    }

    pub fn is_multi_line(&self) -> bool {
        self.multi_line
    }

    /// Weighted operation count used for ranking: merges count
    /// [`MERGE_WEIGHT`], every other operation counts one.
    pub fn complexity(&self) -> usize {
        self.operations
            .iter()
            .map(|op| match op {
                Operation::Merge(_) => MERGE_WEIGHT,
                _ => 1,
            })
            .sum()
    }

    /// Number of merge operations in the chain.
    pub fn merge_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.kind() == OperationKind::Merge)
            .count()
    }

    /// Entities joined into the chain, in join order.
    pub fn merge_entities(&self) -> Vec<&str> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                Operation::Merge(m) => Some(m.entity()),
                _ => None,
            })
            .collect()
    }

    /// Returns true if the chain contains an operation of this kind.
    pub fn contains(&self, kind: OperationKind) -> bool {
        self.operations.iter().any(|op| op.kind() == kind)
    }

    /// Execute the chain against the sample tables by direct
    /// application, returning the final frame.
    pub fn execute(&self, ctx: &ExecutionContext<'_>) -> QueryResult<Frame> {
        let mut frame = ctx.table(&self.entity)?.clone();

        for op in &self.operations {
            frame = op.apply(&frame, ctx)?;
        }

        Ok(frame)
    }

    /// Render the chain as one expression, e.g.
    /// `order[(order['O_TOTAL'] >= 100)].merge(customer, ...)`.
    pub fn render_single_line(&self) -> String {
        let mut text = self.entity.clone();
        for op in &self.operations {
            text.push_str(&op.render(&self.entity));
        }
        text
    }

    /// Render the chain as a statement sequence assigning `df1..dfN`,
    /// starting at `start_counter`. Returns the text and the next free
    /// counter value.
    pub fn render_multi_line(&self, start_counter: usize) -> (String, usize) {
        let mut lines = Vec::with_capacity(self.operations.len());
        let mut counter = start_counter;
        let mut source = self.entity.clone();

        for op in &self.operations {
            lines.push(format!("df{counter} = {source}{}", op.render(&source)));
            source = format!("df{counter}");
            counter += 1;
        }

        if lines.is_empty() {
            return (self.entity.clone(), counter);
        }

        (lines.join("\n"), counter)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multi_line {
            write!(f, "{}", self.render_multi_line(1).0)
        } else {
            write!(f, "{}", self.render_single_line())
        }
    }
}
