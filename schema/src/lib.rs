//! Quarry Schema Model
//!
//! This crate defines the relational schema that query generation is
//! driven by:
//! - `Property`: the typed domain of a column plus its generation bounds
//! - `Entity`: a named relation with ordered columns, a primary key and
//!   foreign keys
//! - `Schema`: the validated collection of entities with foreign-key
//!   graph queries (related entities, topological generation order)
//!
//! Schemas load from a JSON configuration and are validated eagerly; a
//! constraint violation surfaces as a [`SchemaError`] naming the
//! offending entity or column, and no partial schema is returned.

mod config;
mod entity;
mod error;
mod property;
mod schema;

pub use config::*;
pub use entity::*;
pub use error::*;
pub use property::*;
pub use schema::*;
