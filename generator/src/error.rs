//! Generator error types.

use thiserror::Error;

/// Result type for batch generation.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors raised while setting up or running batch generation. Query
/// execution failures are not among them; those are pool outcomes.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Structure(#[from] quarry_builder::StructureError),

    #[error(transparent)]
    Sample(#[from] quarry_sample::SampleError),

    #[error("schema contains no entities")]
    EmptySchema,

    #[error("invalid generation options: {message}")]
    InvalidOptions { message: String },

    #[error("malformed generation options: {message}")]
    Malformed { message: String },
}

impl GeneratorError {
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed {
            message: e.to_string(),
        }
    }
}
