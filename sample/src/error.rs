//! Sample-data generation errors.

use thiserror::Error;

/// Result type for sample-data generation.
pub type SampleResult<T> = Result<T, SampleError>;

/// Errors raised while generating sample tables. These are fatal for
/// the affected run: dependent entities cannot be generated without
/// their referenced data.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Schema(#[from] quarry_schema::SchemaError),

    #[error(
        "entity {entity}: could not generate a distinct primary key within {attempts} attempts"
    )]
    PrimaryKeyExhausted { entity: String, attempts: usize },

    #[error("entity {entity}: foreign key {column} has no referenced values to draw from")]
    EmptyReferencePool { entity: String, column: String },
}
