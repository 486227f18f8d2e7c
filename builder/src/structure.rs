//! The generation policy.

use serde::{Deserialize, Serialize};

use crate::{StructureError, StructureResult};

/// Probability and limit settings controlling what generated queries
/// look like: how likely each optional stage is to fire and how large
/// each operation may grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryStructure {
    /// Probability of a selection stage, in [0, 1].
    pub selection_probability: f64,
    /// Probability of a projection stage, in [0, 1].
    pub projection_probability: f64,
    /// Probability of a terminal group-by aggregation, in [0, 1].
    pub groupby_aggregation_probability: f64,
    /// Upper bound on conditions per selection.
    pub max_selection_conditions: usize,
    /// Upper bound on columns kept by a projection.
    pub max_projection_columns: usize,
    /// Upper bound on group-by key columns.
    pub max_groupby_columns: usize,
    /// Upper bound on merges per query.
    pub max_merges: usize,
}

impl Default for QueryStructure {
    fn default() -> Self {
        Self {
            selection_probability: 0.5,
            projection_probability: 0.5,
            groupby_aggregation_probability: 0.5,
            max_selection_conditions: 2,
            max_projection_columns: 4,
            max_groupby_columns: 2,
            max_merges: 2,
        }
    }
}

impl QueryStructure {
    /// Parse a policy from JSON text; absent fields take their
    /// defaults. The parsed policy is validated before it is returned.
    pub fn from_json(content: &str) -> StructureResult<Self> {
        let structure: QueryStructure = serde_json::from_str(content)?;
        structure.validate()?;
        Ok(structure)
    }

    /// Check every probability lies in [0, 1].
    pub fn validate(&self) -> StructureResult<()> {
        let probabilities = [
            ("selection_probability", self.selection_probability),
            ("projection_probability", self.projection_probability),
            (
                "groupby_aggregation_probability",
                self.groupby_aggregation_probability,
            ),
        ];

        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(StructureError::ProbabilityOutOfRange { field, value });
            }
        }

        Ok(())
    }

    pub fn with_selection_probability(mut self, p: f64) -> Self {
        self.selection_probability = p;
        self
    }

    pub fn with_projection_probability(mut self, p: f64) -> Self {
        self.projection_probability = p;
        self
    }

    pub fn with_groupby_aggregation_probability(mut self, p: f64) -> Self {
        self.groupby_aggregation_probability = p;
        self
    }

    pub fn with_max_selection_conditions(mut self, n: usize) -> Self {
        self.max_selection_conditions = n;
        self
    }

    pub fn with_max_projection_columns(mut self, n: usize) -> Self {
        self.max_projection_columns = n;
        self
    }

    pub fn with_max_groupby_columns(mut self, n: usize) -> Self {
        self.max_groupby_columns = n;
        self
    }

    pub fn with_max_merges(mut self, n: usize) -> Self {
        self.max_merges = n;
        self
    }

    /// Policy with every optional stage disabled; useful as a baseline.
    pub fn disabled() -> Self {
        Self {
            selection_probability: 0.0,
            projection_probability: 0.0,
            groupby_aggregation_probability: 0.0,
            max_selection_conditions: 0,
            max_projection_columns: 0,
            max_groupby_columns: 0,
            max_merges: 0,
        }
    }
}
