//! Quarry Sample Data
//!
//! Synthetic sample-table generation: one `Frame` per entity, with
//! property bounds honored, unique primary keys kept duplicate-free,
//! and foreign-key cells drawn from the referenced entity's generated
//! values (referential integrity). Entities are processed in
//! foreign-key topological order; a cycle in the foreign-key graph is
//! an error.

mod error;
mod generator;

pub use error::*;
pub use generator::*;
