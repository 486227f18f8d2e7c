//! Quarry Generator
//!
//! Batch orchestration: repeated query-builder invocations over a
//! shared schema, policy and sample tables. Slots are independent
//! (each gets its own seeded random stream), so construction runs
//! sequentially or on a rayon pool without shared mutable state. An
//! optional retry mode rebuilds a slot until its query returns a
//! non-empty result or a bounded attempt budget runs out.

mod error;
mod options;

pub use error::*;
pub use options::*;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use quarry_builder::{QueryBuilder, QueryStructure};
use quarry_core::Frame;
use quarry_pool::QueryPool;
use quarry_query::Query;
use quarry_sample::{SampleGenerator, DEFAULT_ROWS_PER_ENTITY};
use quarry_schema::Schema;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Attempt budget per slot in `ensure_non_empty` mode. On exhaustion
/// the last candidate is kept and a warning is logged.
const NON_EMPTY_RETRY_LIMIT: usize = 50;

/// Generates pools of random queries for one schema and policy.
///
/// Sample tables are generated eagerly at construction, in foreign-key
/// topological order, so every generated query can be executed
/// immediately.
pub struct Generator {
    schema: Schema,
    structure: QueryStructure,
    sample_data: Arc<BTreeMap<String, Frame>>,
    seed: u64,
}

impl Generator {
    /// Create a generator with a random seed and the default sample
    /// row count.
    pub fn new(schema: Schema, structure: QueryStructure) -> GeneratorResult<Self> {
        let seed = rand::thread_rng().gen();
        Self::with_config(schema, structure, seed, DEFAULT_ROWS_PER_ENTITY)
    }

    /// Create a generator with an explicit seed (for reproducible
    /// batches) and sample row count.
    pub fn with_config(
        schema: Schema,
        structure: QueryStructure,
        seed: u64,
        sample_rows: usize,
    ) -> GeneratorResult<Self> {
        structure.validate()?;

        if schema.entities().is_empty() {
            return Err(GeneratorError::EmptySchema);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let sample_data = SampleGenerator::new(sample_rows).generate(&schema, &mut rng)?;

        Ok(Self {
            schema,
            structure,
            sample_data: Arc::new(sample_data),
            seed,
        })
    }

    /// The sample tables queries will run against.
    pub fn sample_data(&self) -> &BTreeMap<String, Frame> {
        &self.sample_data
    }

    /// Generate a pool of `options.num_queries` queries.
    pub fn generate(&self, options: &GenerateOptions) -> GeneratorResult<QueryPool> {
        if options.num_queries == 0 {
            return Err(GeneratorError::invalid_options(
                "num_queries must be positive",
            ));
        }

        let queries: Vec<Query> = if options.multi_processing {
            (0..options.num_queries)
                .into_par_iter()
                .map(|slot| self.build_slot(slot, options))
                .collect()
        } else {
            (0..options.num_queries)
                .map(|slot| self.build_slot(slot, options))
                .collect()
        };

        debug!("generated {} queries", queries.len());

        Ok(QueryPool::new(
            queries,
            self.structure.clone(),
            Arc::clone(&self.sample_data),
        ))
    }

    /// Build the query for one slot with its own random stream.
    fn build_slot(&self, slot: usize, options: &GenerateOptions) -> Query {
        let mut rng = StdRng::seed_from_u64(slot_seed(self.seed, slot));
        let builder = QueryBuilder::new(&self.schema, &self.structure, options.multi_line);

        let mut query = builder.build(&mut rng);

        if !options.ensure_non_empty {
            return query;
        }

        // Empty results and errors both trigger a rebuild.
        for _ in 0..NON_EMPTY_RETRY_LIMIT {
            let outcome = QueryPool::execute_single(&query, &self.sample_data);
            if outcome.is_non_empty() {
                return query;
            }
            query = builder.build(&mut rng);
        }

        warn!(
            "slot {slot}: no non-empty query within {NON_EMPTY_RETRY_LIMIT} attempts, keeping last"
        );

        query
    }
}

/// Derive an independent per-slot seed from the base seed.
fn slot_seed(base: u64, slot: usize) -> u64 {
    base.wrapping_add((slot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}
