//! Schema error types.

use thiserror::Error;

/// Result type for schema loading and validation.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while loading or validating a schema. All of these are
/// fatal: no partial schema is ever returned.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed schema configuration: {message}")]
    Malformed { message: String },

    #[error("duplicate entity name: {name}")]
    DuplicateEntity { name: String },

    #[error("entity {entity}: invalid property {column}: {message}")]
    InvalidProperty {
        entity: String,
        column: String,
        message: String,
    },

    #[error("entity {entity}: {key} column {column} does not exist")]
    UnknownColumn {
        entity: String,
        column: String,
        key: String,
    },

    #[error(
        "entity {entity}: foreign key {column} references unknown entity {referenced}"
    )]
    UnknownReferencedEntity {
        entity: String,
        column: String,
        referenced: String,
    },

    #[error(
        "entity {entity}: foreign key {column} references unknown column {referenced_column} of {referenced}"
    )]
    UnknownReferencedColumn {
        entity: String,
        column: String,
        referenced_column: String,
        referenced: String,
    },

    #[error("foreign-key cycle involving entity {entity}")]
    CyclicForeignKeys { entity: String },
}

impl SchemaError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn invalid_property(
        entity: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidProperty {
            entity: entity.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn unknown_column(
        entity: impl Into<String>,
        column: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::UnknownColumn {
            entity: entity.into(),
            column: column.into(),
            key: key.into(),
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed {
            message: e.to_string(),
        }
    }
}
