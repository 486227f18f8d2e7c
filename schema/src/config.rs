//! Schema configuration parsing.
//!
//! Schemas load from a JSON document of the form:
//!
//! ```json
//! {
//!   "entities": {
//!     "customer": {
//!       "properties": {
//!         "C_CUSTKEY": { "type": "int", "min": 1, "max": 1000 },
//!         "C_NAME": { "type": "string", "starting_character": ["C"] }
//!       },
//!       "primary_key": "C_CUSTKEY",
//!       "foreign_keys": {}
//!     },
//!     "order": {
//!       "properties": {
//!         "O_ORDERKEY": { "type": "int", "min": 1, "max": 5000 },
//!         "O_CUSTKEY": { "type": "int", "min": 1, "max": 1000 }
//!       },
//!       "primary_key": "O_ORDERKEY",
//!       "foreign_keys": { "O_CUSTKEY": ["C_CUSTKEY", "customer"] }
//!     }
//!   }
//! }
//! ```
//!
//! Entity and property order in the document is preserved: it defines
//! entity iteration order and sample-table column order.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::{Column, Entity, ForeignKey, PrimaryKey, Property, SchemaError, SchemaResult};

/// Top-level schema configuration document.
#[derive(Debug, Deserialize)]
pub struct SchemaConfig {
    pub entities: Map<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
struct EntityConfig {
    #[serde(default)]
    properties: Map<String, JsonValue>,
    #[serde(default)]
    primary_key: Option<KeyConfig>,
    #[serde(default)]
    foreign_keys: Map<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyConfig {
    Single(String),
    Composite(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PropertyConfig {
    Int {
        min: i64,
        max: i64,
    },
    Float {
        min: f64,
        max: f64,
    },
    String {
        starting_character: Vec<String>,
    },
    Enum {
        values: Vec<String>,
    },
    Date {
        min: String,
        max: String,
    },
}

impl SchemaConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(content: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Build one entity from its configuration object.
pub(crate) fn entity_from_config(name: &str, config: &JsonValue) -> SchemaResult<Entity> {
    let config: EntityConfig = serde_json::from_value(config.clone())
        .map_err(|e| SchemaError::malformed(format!("entity {name}: {e}")))?;

    let mut columns = Vec::with_capacity(config.properties.len());

    for (column, raw) in &config.properties {
        let property = property_from_config(name, column, raw)?;
        columns.push(Column {
            name: column.clone(),
            property,
        });
    }

    let primary_key = config.primary_key.map(|key| match key {
        KeyConfig::Single(column) => PrimaryKey::Single(column),
        KeyConfig::Composite(columns) => PrimaryKey::Composite(columns),
    });

    let mut foreign_keys = Vec::with_capacity(config.foreign_keys.len());

    for (column, target) in &config.foreign_keys {
        let (referenced_column, referenced_entity): (String, String) =
            serde_json::from_value(target.clone()).map_err(|_| {
                SchemaError::malformed(format!(
                    "entity {name}: foreign key {column} must be a [referenced_column, referenced_entity] pair"
                ))
            })?;

        foreign_keys.push(ForeignKey {
            column: column.clone(),
            referenced_column,
            referenced_entity,
        });
    }

    Ok(Entity {
        name: name.to_string(),
        columns,
        primary_key,
        foreign_keys,
    })
}

fn property_from_config(
    entity: &str,
    column: &str,
    raw: &JsonValue,
) -> SchemaResult<Property> {
    let config: PropertyConfig = serde_json::from_value(raw.clone())
        .map_err(|e| SchemaError::invalid_property(entity, column, e.to_string()))?;

    let property = match config {
        PropertyConfig::Int { min, max } => {
            if min > max {
                return Err(SchemaError::invalid_property(
                    entity,
                    column,
                    format!("min {min} exceeds max {max}"),
                ));
            }
            Property::Int { min, max }
        }
        PropertyConfig::Float { min, max } => {
            if min > max {
                return Err(SchemaError::invalid_property(
                    entity,
                    column,
                    format!("min {min} exceeds max {max}"),
                ));
            }
            Property::Float { min, max }
        }
        PropertyConfig::String { starting_character } => {
            if starting_character.is_empty() {
                return Err(SchemaError::invalid_property(
                    entity,
                    column,
                    "starting_character must not be empty",
                ));
            }
            Property::String {
                starting_characters: starting_character,
            }
        }
        PropertyConfig::Enum { values } => {
            if values.is_empty() {
                return Err(SchemaError::invalid_property(
                    entity,
                    column,
                    "enum values must not be empty",
                ));
            }
            Property::Enum { values }
        }
        PropertyConfig::Date { min, max } => {
            let min = parse_date(entity, column, &min)?;
            let max = parse_date(entity, column, &max)?;
            if min > max {
                return Err(SchemaError::invalid_property(
                    entity,
                    column,
                    format!("min {min} exceeds max {max}"),
                ));
            }
            Property::Date { min, max }
        }
    };

    Ok(property)
}

fn parse_date(entity: &str, column: &str, raw: &str) -> SchemaResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        SchemaError::invalid_property(
            entity,
            column,
            format!("invalid ISO date: {raw}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_order_preserved() {
        let config = serde_json::json!({
            "properties": {
                "z": { "type": "int", "min": 0, "max": 1 },
                "a": { "type": "int", "min": 0, "max": 1 }
            }
        });

        let entity = entity_from_config("t", &config).unwrap();
        assert_eq!(entity.column_names(), vec!["z", "a"]);
    }

    #[test]
    fn test_unknown_property_type_rejected() {
        let config = serde_json::json!({
            "properties": { "x": { "type": "uuid" } }
        });

        let err = entity_from_config("t", &config).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidProperty { .. }));
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let config = serde_json::json!({
            "properties": { "x": { "type": "int", "min": 10, "max": 1 } }
        });

        let err = entity_from_config("t", &config).unwrap_err();
        assert!(err.to_string().contains("min 10 exceeds max 1"));
    }

    #[test]
    fn test_composite_primary_key() {
        let config = serde_json::json!({
            "properties": {
                "a": { "type": "int", "min": 0, "max": 1 },
                "b": { "type": "int", "min": 0, "max": 1 }
            },
            "primary_key": ["a", "b"]
        });

        let entity = entity_from_config("t", &config).unwrap();
        assert_eq!(
            entity.primary_key,
            Some(PrimaryKey::Composite(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_foreign_key_pair() {
        let config = serde_json::json!({
            "properties": { "fk": { "type": "int", "min": 0, "max": 1 } },
            "foreign_keys": { "fk": ["id", "parent"] }
        });

        let entity = entity_from_config("t", &config).unwrap();
        assert_eq!(
            entity.foreign_keys,
            vec![ForeignKey {
                column: "fk".into(),
                referenced_column: "id".into(),
                referenced_entity: "parent".into(),
            }]
        );
    }

    #[test]
    fn test_date_parsing() {
        let config = serde_json::json!({
            "properties": {
                "d": { "type": "date", "min": "2020-01-01", "max": "2020-12-31" }
            }
        });

        let entity = entity_from_config("t", &config).unwrap();
        match &entity.columns[0].property {
            Property::Date { min, max } => {
                assert_eq!(min.to_string(), "2020-01-01");
                assert_eq!(max.to_string(), "2020-12-31");
            }
            other => panic!("expected date property, got {other:?}"),
        }
    }
}
