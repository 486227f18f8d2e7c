//! Quarry Query Model
//!
//! This crate defines the operation chain that makes up a generated
//! query:
//! - `Condition`: one `column <op> literal` predicate
//! - `Operation`: the closed set of transformation steps (selection,
//!   projection, merge, group-by aggregation) with a shared
//!   apply/render/column-effect contract
//! - `Query`: an entity plus an ordered operation chain, renderable to
//!   a single-line expression or a multi-line statement sequence and
//!   executable against sample tables
//!
//! Execution errors are captured values, not panics: a query that
//! references a missing column or compares incompatible types yields a
//! [`QueryError`] that the pool records per query.

mod condition;
mod error;
mod ops;
mod query;

pub use condition::*;
pub use error::*;
pub use ops::*;
pub use query::*;
