//! The validated schema.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

use crate::{config, Entity, SchemaConfig, SchemaError, SchemaResult};

/// A foreign-key relationship usable as a join, seen from one side.
///
/// `local_column` belongs to the entity the relationship was looked up
/// from; `remote_column` belongs to `entity`, the related one.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub entity: String,
    pub local_column: String,
    pub remote_column: String,
}

/// A validated collection of entities.
///
/// Entity order follows the configuration document; a name index backs
/// constant-time lookup. Every foreign key is guaranteed to resolve to
/// an existing entity and column.
#[derive(Debug, Clone)]
pub struct Schema {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build and validate a schema from parsed configuration.
    pub fn from_config(config: SchemaConfig) -> SchemaResult<Self> {
        let mut entities = Vec::with_capacity(config.entities.len());

        for (name, entity_config) in &config.entities {
            entities.push(config::entity_from_config(name, entity_config)?);
        }

        Self::new(entities)
    }

    /// Build and validate a schema from JSON text.
    pub fn from_json(content: &str) -> SchemaResult<Self> {
        Self::from_config(SchemaConfig::from_json(content)?)
    }

    /// Build and validate a schema from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate a set of entities and assemble the schema.
    pub fn new(entities: Vec<Entity>) -> SchemaResult<Self> {
        let mut index = HashMap::with_capacity(entities.len());

        for (i, entity) in entities.iter().enumerate() {
            if index.insert(entity.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateEntity {
                    name: entity.name.clone(),
                });
            }
        }

        for entity in &entities {
            if let Some(key) = &entity.primary_key {
                for column in key.columns() {
                    if !entity.has_column(column) {
                        return Err(SchemaError::unknown_column(
                            &entity.name,
                            column,
                            "primary key",
                        ));
                    }
                }
            }

            for fk in &entity.foreign_keys {
                if !entity.has_column(&fk.column) {
                    return Err(SchemaError::unknown_column(
                        &entity.name,
                        &fk.column,
                        "foreign key",
                    ));
                }

                let Some(&target) = index.get(&fk.referenced_entity) else {
                    return Err(SchemaError::UnknownReferencedEntity {
                        entity: entity.name.clone(),
                        column: fk.column.clone(),
                        referenced: fk.referenced_entity.clone(),
                    });
                };

                if !entities[target].has_column(&fk.referenced_column) {
                    return Err(SchemaError::UnknownReferencedColumn {
                        entity: entity.name.clone(),
                        column: fk.column.clone(),
                        referenced_column: fk.referenced_column.clone(),
                        referenced: fk.referenced_entity.clone(),
                    });
                }
            }
        }

        Ok(Self { entities, index })
    }

    /// All entities, in configuration order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Look up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|&i| &self.entities[i])
    }

    /// Entity names, in configuration order.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    /// Foreign-key relationships of an entity, in both directions:
    /// keys it declares plus keys other entities declare against it.
    pub fn related(&self, name: &str) -> Vec<Relationship> {
        let mut relationships = Vec::new();

        if let Some(entity) = self.entity(name) {
            for fk in &entity.foreign_keys {
                relationships.push(Relationship {
                    entity: fk.referenced_entity.clone(),
                    local_column: fk.column.clone(),
                    remote_column: fk.referenced_column.clone(),
                });
            }
        }

        for other in &self.entities {
            if other.name == name {
                continue;
            }
            for fk in &other.foreign_keys {
                if fk.referenced_entity == name {
                    relationships.push(Relationship {
                        entity: other.name.clone(),
                        local_column: fk.referenced_column.clone(),
                        remote_column: fk.column.clone(),
                    });
                }
            }
        }

        relationships
    }

    /// Entities in dependency order: every entity appears after the
    /// entities its foreign keys reference. Sample data must be
    /// generated in this order so foreign-key cells can draw from
    /// already-generated referenced values.
    pub fn topological_order(&self) -> SchemaResult<Vec<&Entity>> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for entity in &self.entities {
            in_degree.entry(entity.name.as_str()).or_insert(0);

            let mut referenced: HashSet<&str> = HashSet::new();
            for fk in &entity.foreign_keys {
                // A second key against the same entity adds no new edge.
                if referenced.insert(fk.referenced_entity.as_str()) {
                    *in_degree.entry(entity.name.as_str()).or_insert(0) += 1;
                    dependents
                        .entry(fk.referenced_entity.as_str())
                        .or_default()
                        .push(entity.name.as_str());
                }
            }
        }

        let mut ready: VecDeque<&str> = self
            .entities
            .iter()
            .map(|e| e.name.as_str())
            .filter(|name| in_degree[name] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.entities.len());

        while let Some(name) = ready.pop_front() {
            if let Some(entity) = self.entity(name) {
                order.push(entity);
            }

            for &dependent in dependents.get(name).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }

        if order.len() != self.entities.len() {
            let stuck = self
                .entities
                .iter()
                .find(|e| !order.iter().any(|o| o.name == e.name))
                .map(|e| e.name.clone())
                .unwrap_or_default();
            return Err(SchemaError::CyclicForeignKeys { entity: stuck });
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CUSTOMER_ORDER: &str = r#"{
        "entities": {
            "customer": {
                "properties": {
                    "C_CUSTKEY": { "type": "int", "min": 1, "max": 100 },
                    "C_NAME": { "type": "string", "starting_character": ["C"] }
                },
                "primary_key": "C_CUSTKEY"
            },
            "order": {
                "properties": {
                    "O_ORDERKEY": { "type": "int", "min": 1, "max": 500 },
                    "O_CUSTKEY": { "type": "int", "min": 1, "max": 100 },
                    "O_TOTAL": { "type": "float", "min": 10.0, "max": 5000.0 }
                },
                "primary_key": "O_ORDERKEY",
                "foreign_keys": { "O_CUSTKEY": ["C_CUSTKEY", "customer"] }
            }
        }
    }"#;

    #[test]
    fn test_load_and_lookup() {
        let schema = Schema::from_json(CUSTOMER_ORDER).unwrap();

        assert_eq!(schema.entity_names(), vec!["customer", "order"]);
        assert!(schema.entity("order").unwrap().has_unique_primary_key());
        assert!(schema.entity("missing").is_none());
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let entities = vec![
            Entity {
                name: "a".into(),
                columns: vec![],
                primary_key: None,
                foreign_keys: vec![],
            },
            Entity {
                name: "a".into(),
                columns: vec![],
                primary_key: None,
                foreign_keys: vec![],
            },
        ];

        let err = Schema::new(entities).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateEntity { .. }));
    }

    #[test]
    fn test_dangling_foreign_key_rejected() {
        let content = r#"{
            "entities": {
                "order": {
                    "properties": {
                        "O_CUSTKEY": { "type": "int", "min": 1, "max": 10 }
                    },
                    "foreign_keys": { "O_CUSTKEY": ["C_CUSTKEY", "customer"] }
                }
            }
        }"#;

        let err = Schema::from_json(content).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownReferencedEntity { .. }));
    }

    #[test]
    fn test_related_covers_both_directions() {
        let schema = Schema::from_json(CUSTOMER_ORDER).unwrap();

        // order declares the key
        let from_order = schema.related("order");
        assert_eq!(
            from_order,
            vec![Relationship {
                entity: "customer".into(),
                local_column: "O_CUSTKEY".into(),
                remote_column: "C_CUSTKEY".into(),
            }]
        );

        // customer is referenced by it
        let from_customer = schema.related("customer");
        assert_eq!(
            from_customer,
            vec![Relationship {
                entity: "order".into(),
                local_column: "C_CUSTKEY".into(),
                remote_column: "O_CUSTKEY".into(),
            }]
        );
    }

    #[test]
    fn test_topological_order() {
        let schema = Schema::from_json(CUSTOMER_ORDER).unwrap();
        let order: Vec<&str> = schema
            .topological_order()
            .unwrap()
            .iter()
            .map(|e| e.name.as_str())
            .collect();

        assert_eq!(order, vec!["customer", "order"]);
    }

    #[test]
    fn test_foreign_key_cycle_detected() {
        let content = r#"{
            "entities": {
                "a": {
                    "properties": { "b_id": { "type": "int", "min": 1, "max": 10 } },
                    "foreign_keys": { "b_id": ["id", "b"] }
                },
                "b": {
                    "properties": {
                        "id": { "type": "int", "min": 1, "max": 10 },
                        "a_id": { "type": "int", "min": 1, "max": 10 }
                    },
                    "foreign_keys": { "a_id": ["b_id", "a"] }
                }
            }
        }"#;

        let schema = Schema::from_json(content).unwrap();
        let err = schema.topological_order().unwrap_err();
        assert!(matches!(err, SchemaError::CyclicForeignKeys { .. }));
    }
}
