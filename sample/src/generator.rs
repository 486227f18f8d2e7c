//! Sample-table generation.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use quarry_core::{Frame, Value};
use quarry_schema::{Entity, PrimaryKey, Property, Schema};
use rand::Rng;

use crate::{SampleError, SampleResult};

/// Resampling budget per row when enforcing primary-key uniqueness.
const KEY_RETRY_LIMIT: usize = 100;

/// Default number of rows generated per entity.
pub const DEFAULT_ROWS_PER_ENTITY: usize = 200;

/// Generates one sample table per entity, honoring property bounds,
/// primary-key uniqueness, and foreign-key referential integrity.
///
/// Entities are generated in foreign-key topological order so a
/// foreign-key cell can always draw from the referenced column's
/// already-generated values.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    rows_per_entity: usize,
}

impl SampleGenerator {
    pub fn new(rows_per_entity: usize) -> Self {
        Self { rows_per_entity }
    }

    /// Generate sample tables for every entity in the schema.
    pub fn generate(
        &self,
        schema: &Schema,
        rng: &mut impl Rng,
    ) -> SampleResult<BTreeMap<String, Frame>> {
        let mut tables = BTreeMap::new();

        for entity in schema.topological_order()? {
            let frame = self.generate_entity(entity, &tables, rng)?;
            debug!(
                "generated {} sample rows for entity {}",
                frame.num_rows(),
                entity.name
            );
            tables.insert(entity.name.clone(), frame);
        }

        Ok(tables)
    }

    /// Generate the sample table for one entity. `tables` must already
    /// contain every entity its foreign keys reference.
    pub fn generate_entity(
        &self,
        entity: &Entity,
        tables: &BTreeMap<String, Frame>,
        rng: &mut impl Rng,
    ) -> SampleResult<Frame> {
        let mut row_count = self.rows_per_entity;

        // A unique integer key whose range is no larger than the
        // requested row count is emitted sequentially; the range then
        // caps the row count.
        let sequential_key = match &entity.primary_key {
            Some(PrimaryKey::Single(key)) => match entity.column(key).map(|c| &c.property) {
                Some(Property::Int { min, max }) => {
                    let range = (max - min + 1) as usize;
                    if range <= row_count {
                        row_count = range;
                        Some((key.clone(), *min))
                    } else {
                        None
                    }
                }
                _ => None,
            },
            _ => None,
        };

        let unique_key = match &entity.primary_key {
            Some(PrimaryKey::Single(key)) if sequential_key.is_none() => {
                entity.column_index(key)
            }
            _ => None,
        };

        let reference_pools = self.reference_pools(entity, tables)?;

        let mut frame = Frame::new(entity.column_names());
        let mut seen_keys: HashSet<String> = HashSet::new();

        for i in 0..row_count {
            let mut attempts = 0;

            loop {
                let row = self.generate_row(entity, &sequential_key, &reference_pools, i, rng);

                let distinct = match unique_key {
                    Some(key_index) => seen_keys.insert(row[key_index].to_string()),
                    None => true,
                };

                if distinct {
                    frame.push_row(row);
                    break;
                }

                attempts += 1;
                if attempts >= KEY_RETRY_LIMIT {
                    return Err(SampleError::PrimaryKeyExhausted {
                        entity: entity.name.clone(),
                        attempts,
                    });
                }
            }
        }

        Ok(frame)
    }

    fn generate_row(
        &self,
        entity: &Entity,
        sequential_key: &Option<(String, i64)>,
        reference_pools: &BTreeMap<String, Vec<Value>>,
        row_index: usize,
        rng: &mut impl Rng,
    ) -> Vec<Value> {
        entity
            .columns
            .iter()
            .map(|column| {
                if let Some((key, min)) = sequential_key {
                    if *key == column.name {
                        return Value::Int(min + row_index as i64);
                    }
                }

                if let Some(pool) = reference_pools.get(&column.name) {
                    return pool[rng.gen_range(0..pool.len())].clone();
                }

                column.property.sample_value(rng)
            })
            .collect()
    }

    /// Collect, per foreign-key column, the referenced column's
    /// already-generated values.
    fn reference_pools(
        &self,
        entity: &Entity,
        tables: &BTreeMap<String, Frame>,
    ) -> SampleResult<BTreeMap<String, Vec<Value>>> {
        let mut pools = BTreeMap::new();

        for fk in &entity.foreign_keys {
            let pool: Vec<Value> = tables
                .get(&fk.referenced_entity)
                .and_then(|frame| {
                    frame
                        .column_index(&fk.referenced_column)
                        .map(|i| frame.column_values(i).cloned().collect())
                })
                .unwrap_or_default();

            if pool.is_empty() && self.rows_per_entity > 0 {
                return Err(SampleError::EmptyReferencePool {
                    entity: entity.name.clone(),
                    column: fk.column.clone(),
                });
            }

            pools.insert(fk.column.clone(), pool);
        }

        Ok(pools)
    }
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_ENTITY)
    }
}
