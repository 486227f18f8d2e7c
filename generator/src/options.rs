//! Generation options.

use serde::{Deserialize, Serialize};

use crate::GeneratorResult;

fn default_num_queries() -> usize {
    1000
}

fn default_multi_processing() -> bool {
    true
}

/// Per-batch options for [`crate::Generator::generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Number of queries to generate; must be positive.
    #[serde(default = "default_num_queries")]
    pub num_queries: usize,
    /// Render queries as multi-line statement sequences.
    #[serde(default)]
    pub multi_line: bool,
    /// Build independent slots on a rayon pool.
    #[serde(default = "default_multi_processing")]
    pub multi_processing: bool,
    /// Rebuild each slot until its query returns a non-empty result,
    /// within a bounded attempt budget.
    #[serde(default)]
    pub ensure_non_empty: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_queries: default_num_queries(),
            multi_line: false,
            multi_processing: default_multi_processing(),
            ensure_non_empty: false,
        }
    }
}

impl GenerateOptions {
    /// Parse options from JSON text; absent fields take their defaults.
    pub fn from_json(content: &str) -> GeneratorResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn with_num_queries(mut self, n: usize) -> Self {
        self.num_queries = n;
        self
    }

    pub fn with_multi_line(mut self, multi_line: bool) -> Self {
        self.multi_line = multi_line;
        self
    }

    pub fn with_multi_processing(mut self, multi_processing: bool) -> Self {
        self.multi_processing = multi_processing;
        self
    }

    pub fn with_ensure_non_empty(mut self, ensure_non_empty: bool) -> Self {
        self.ensure_non_empty = ensure_non_empty;
        self
    }
}
