//! Quarry Core Types
//!
//! This crate provides the foundational types used throughout quarry:
//! - The `Value` enum for scalar cell data (Int, Float, Str, Date)
//! - The `Frame` tabular dataset that generated queries run against
//! - Comparison and logical operators for selection predicates

mod frame;
mod operators;
mod value;

pub use frame::*;
pub use operators::*;
pub use value::*;
