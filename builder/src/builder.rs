//! The randomized query builder.
//!
//! Building is a small state machine over an explicit context value:
//!
//! ```text
//! START -> (SELECT?) -> (MERGE loop, 0..max_merges) -> (PROJECT?)
//!       -> (GROUPBY?) -> DONE
//! ```
//!
//! Each optional stage fires on a Bernoulli draw against its
//! probability in the policy. Projection runs after the merge loop, so
//! a join key can never be narrowed away before the merge that needs
//! it. A stage with no valid choice (no eligible merge target, no
//! columns left) is skipped, never an error.

use std::collections::BTreeSet;

use log::debug;
use quarry_core::LogicalOperator;
use quarry_query::{
    Aggregate, Condition, GroupByAggregation, Merge, Operation, Projection, Query, Selection,
};
use quarry_schema::{Entity, Property, Schema};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::QueryStructure;

/// Per-iteration probability of continuing the merge loop while under
/// the cap and a candidate exists.
const MERGE_CONTINUE_PROBABILITY: f64 = 0.5;

/// Mutable state threaded through the construction stages.
///
/// Keeping it an explicit value (rather than ambient builder fields)
/// keeps parallel slot construction trivially independent.
struct BuilderContext {
    entity: String,
    current_columns: BTreeSet<String>,
    visited: Vec<String>,
    operations: Vec<Operation>,
}

/// Builds one random [`Query`] per invocation from a schema and a
/// generation policy.
pub struct QueryBuilder<'a> {
    schema: &'a Schema,
    structure: &'a QueryStructure,
    multi_line: bool,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(schema: &'a Schema, structure: &'a QueryStructure, multi_line: bool) -> Self {
        Self {
            schema,
            structure,
            multi_line,
        }
    }

    /// Build a query starting from a uniformly random entity.
    pub fn build(&self, rng: &mut impl Rng) -> Query {
        let entities = self.schema.entities();
        let entity = &entities[rng.gen_range(0..entities.len())];
        self.build_from(entity, rng)
    }

    /// Build a query starting from the given entity.
    pub fn build_from(&self, entity: &Entity, rng: &mut impl Rng) -> Query {
        let mut ctx = BuilderContext {
            entity: entity.name.clone(),
            current_columns: entity.column_names().into_iter().collect(),
            visited: vec![entity.name.clone()],
            operations: Vec::new(),
        };

        self.maybe_selection(&mut ctx, rng);
        self.merge_loop(&mut ctx, rng);
        self.maybe_projection(&mut ctx, rng);
        self.maybe_groupby(&mut ctx, rng);

        debug!(
            "built query on {} with {} operations",
            ctx.entity,
            ctx.operations.len()
        );

        Query::new(ctx.entity, ctx.operations, ctx.current_columns, self.multi_line)
    }

    fn maybe_selection(&self, ctx: &mut BuilderContext, rng: &mut impl Rng) {
        if self.structure.max_selection_conditions == 0
            || ctx.current_columns.is_empty()
            || !rng.gen_bool(self.structure.selection_probability)
        {
            return;
        }

        let columns: Vec<&String> = ctx.current_columns.iter().collect();
        let count = rng.gen_range(1..=self.structure.max_selection_conditions);

        let mut conditions = Vec::with_capacity(count);

        for _ in 0..count {
            let column = columns[rng.gen_range(0..columns.len())];
            let Some(property) = self.property_of(ctx, column) else {
                continue;
            };

            let operators = property.comparison_operators();
            let operator = operators[rng.gen_range(0..operators.len())];
            let value = property.condition_value(operator, rng);

            conditions.push(Condition::new(column.clone(), operator, value));
        }

        if conditions.is_empty() {
            return;
        }

        let connectives = (1..conditions.len())
            .map(|_| {
                if rng.gen_bool(0.5) {
                    LogicalOperator::And
                } else {
                    LogicalOperator::Or
                }
            })
            .collect();

        self.push(ctx, Operation::Selection(Selection::new(conditions, connectives)));
    }

    fn merge_loop(&self, ctx: &mut BuilderContext, rng: &mut impl Rng) {
        for _ in 0..self.structure.max_merges {
            let candidates = self.merge_candidates(ctx);
            if candidates.is_empty() {
                debug!("no eligible merge target from {}", ctx.entity);
                break;
            }

            if !rng.gen_bool(MERGE_CONTINUE_PROBABILITY) {
                break;
            }

            let (local, remote, target) = candidates[rng.gen_range(0..candidates.len())].clone();
            let columns = self
                .schema
                .entity(&target)
                .map(|e| e.column_names())
                .unwrap_or_default();

            ctx.visited.push(target.clone());
            self.push(ctx, Operation::Merge(Merge::new(target, local, remote, columns)));
        }
    }

    /// Foreign-key edges from any visited entity to an unvisited one,
    /// where the local join column is still available.
    fn merge_candidates(&self, ctx: &BuilderContext) -> Vec<(String, String, String)> {
        let mut candidates = Vec::new();

        for visited in &ctx.visited {
            for relationship in self.schema.related(visited) {
                if ctx.visited.contains(&relationship.entity) {
                    continue;
                }
                if !ctx.current_columns.contains(&relationship.local_column) {
                    continue;
                }
                candidates.push((
                    relationship.local_column,
                    relationship.remote_column,
                    relationship.entity,
                ));
            }
        }

        candidates
    }

    fn maybe_projection(&self, ctx: &mut BuilderContext, rng: &mut impl Rng) {
        if self.structure.max_projection_columns == 0
            || ctx.current_columns.is_empty()
            || !rng.gen_bool(self.structure.projection_probability)
        {
            return;
        }

        let columns: Vec<String> = ctx.current_columns.iter().cloned().collect();
        let count = rng.gen_range(
            1..=self
                .structure
                .max_projection_columns
                .min(columns.len()),
        );

        let kept: Vec<String> = columns
            .choose_multiple(rng, count)
            .cloned()
            .collect();

        self.push(ctx, Operation::Projection(Projection::new(kept)));
    }

    fn maybe_groupby(&self, ctx: &mut BuilderContext, rng: &mut impl Rng) {
        if self.structure.max_groupby_columns == 0
            || ctx.current_columns.is_empty()
            || !rng.gen_bool(self.structure.groupby_aggregation_probability)
        {
            return;
        }

        let columns: Vec<String> = ctx.current_columns.iter().cloned().collect();
        let count = rng.gen_range(1..=self.structure.max_groupby_columns.min(columns.len()));

        let keys: Vec<String> = columns.choose_multiple(rng, count).cloned().collect();

        let value_columns: Vec<String> = columns
            .iter()
            .filter(|c| !keys.contains(*c))
            .filter(|c| {
                self.property_of(ctx, c)
                    .map(Property::is_numeric)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        let aggregate = Aggregate::ALL[rng.gen_range(0..Aggregate::ALL.len())];

        self.push(
            ctx,
            Operation::GroupByAggregation(GroupByAggregation::new(keys, value_columns, aggregate)),
        );
    }

    /// The property backing an available column, resolved against the
    /// visited entities in join order. On a name collision the earliest
    /// visited entity wins, matching the merge's column-union rule.
    fn property_of(&self, ctx: &BuilderContext, column: &str) -> Option<&Property> {
        ctx.visited
            .iter()
            .filter_map(|name| self.schema.entity(name))
            .find_map(|entity| entity.column(column).map(|c| &c.property))
    }

    fn push(&self, ctx: &mut BuilderContext, operation: Operation) {
        ctx.current_columns = operation.produced_columns(&ctx.current_columns);
        ctx.operations.push(operation);
    }
}
