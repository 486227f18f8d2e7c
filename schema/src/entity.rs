//! Entities.
//!
//! An entity is a named relation: ordered typed columns, an optional
//! primary key and foreign-key references to other entities. Entities
//! are constructed once at schema-load time and immutable thereafter.

use std::collections::BTreeMap;

use crate::Property;

/// A named, typed column of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub property: Property,
}

/// Primary key of an entity: one column or an ordered composite.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

impl PrimaryKey {
    /// Key columns in declaration order.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            PrimaryKey::Single(c) => vec![c.as_str()],
            PrimaryKey::Composite(cs) => cs.iter().map(String::as_str).collect(),
        }
    }
}

/// A foreign-key reference from a local column to a column of another
/// entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub column: String,
    pub referenced_column: String,
    pub referenced_entity: String,
}

/// Generation bounds of a property, for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum DataRange {
    /// Numeric or date interval, rendered inclusively.
    Interval { min: String, max: String },
    /// Enumerated members or allowed starting characters.
    Values(Vec<String>),
}

/// A named relation in the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    /// Columns in configuration order; this order is the column order of
    /// generated sample tables.
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl Entity {
    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns true if the entity declares a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Position of a column in declaration order.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// True iff the primary key is a single column, whose sample values
    /// are generated duplicate-free.
    pub fn has_unique_primary_key(&self) -> bool {
        matches!(self.primary_key, Some(PrimaryKey::Single(_)))
    }

    /// The foreign key declared on a local column, if any.
    pub fn foreign_key_on(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    /// Per-column generation bounds, for diagnostics and reports.
    pub fn data_ranges(&self) -> BTreeMap<String, DataRange> {
        self.columns
            .iter()
            .map(|c| {
                let range = match &c.property {
                    Property::Int { min, max } => DataRange::Interval {
                        min: min.to_string(),
                        max: max.to_string(),
                    },
                    Property::Float { min, max } => DataRange::Interval {
                        min: min.to_string(),
                        max: max.to_string(),
                    },
                    Property::Date { min, max } => DataRange::Interval {
                        min: min.format("%Y-%m-%d").to_string(),
                        max: max.format("%Y-%m-%d").to_string(),
                    },
                    Property::String {
                        starting_characters,
                    } => DataRange::Values(starting_characters.clone()),
                    Property::Enum { values } => DataRange::Values(values.clone()),
                };
                (c.name.clone(), range)
            })
            .collect()
    }
}
