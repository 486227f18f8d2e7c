//! The query pool.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;
use quarry_builder::QueryStructure;
use quarry_core::Frame;
use quarry_query::{ExecutionContext, Query};
use rayon::prelude::*;

use crate::{PoolError, PoolResult, QueryOutcome, Statistics};

/// Outcome predicate for [`QueryPool::filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFilter {
    /// Executed successfully with zero rows.
    Empty,
    /// Executed successfully with at least one row.
    NonEmpty,
    /// Execution raised an error.
    HasError,
    /// Executed successfully, empty or not.
    WithoutError,
}

impl QueryFilter {
    pub fn matches(&self, outcome: &QueryOutcome) -> bool {
        match self {
            QueryFilter::Empty => outcome.is_empty(),
            QueryFilter::NonEmpty => outcome.is_non_empty(),
            QueryFilter::HasError => outcome.is_error(),
            QueryFilter::WithoutError => !outcome.is_error(),
        }
    }
}

impl FromStr for QueryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(QueryFilter::Empty),
            "non-empty" => Ok(QueryFilter::NonEmpty),
            "has-error" => Ok(QueryFilter::HasError),
            "without-error" => Ok(QueryFilter::WithoutError),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// A batch of generated queries plus their execution outcomes.
///
/// The pool owns the policy that built its queries (echoed in
/// statistics) and shares the read-only sample tables the queries run
/// against. Outcomes are written once per index by [`execute`] and read
/// by filtering, sorting and statistics.
///
/// [`execute`]: QueryPool::execute
#[derive(Debug, Clone)]
pub struct QueryPool {
    queries: Vec<Query>,
    structure: QueryStructure,
    sample_data: Arc<BTreeMap<String, Frame>>,
    results: Vec<Option<QueryOutcome>>,
    with_status: bool,
}

impl QueryPool {
    pub fn new(
        queries: Vec<Query>,
        structure: QueryStructure,
        sample_data: impl Into<Arc<BTreeMap<String, Frame>>>,
    ) -> Self {
        let results = vec![None; queries.len()];
        Self {
            queries,
            structure,
            sample_data: sample_data.into(),
            results,
            with_status: false,
        }
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// Rendered query text, in pool order. This plus [`statistics`] is
    /// the surface downstream reporting consumes.
    ///
    /// [`statistics`]: QueryPool::statistics
    pub fn rendered_queries(&self) -> Vec<String> {
        self.queries.iter().map(Query::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// The policy the queries were built with.
    pub fn structure(&self) -> &QueryStructure {
        &self.structure
    }

    /// The sample tables queries execute against.
    pub fn sample_data(&self) -> &BTreeMap<String, Frame> {
        &self.sample_data
    }

    /// Returns true once [`QueryPool::execute`] has run.
    pub fn with_status(&self) -> bool {
        self.with_status
    }

    /// Execute one query against a set of sample tables, capturing the
    /// produced frame or the raised error. Never panics; also used by
    /// the generator's retry-until-non-empty loop.
    pub fn execute_single(query: &Query, tables: &BTreeMap<String, Frame>) -> QueryOutcome {
        let ctx = ExecutionContext::new(tables);
        QueryOutcome::from(query.execute(&ctx))
    }

    /// Execute every query, recording one outcome per index. With
    /// `parallel` the queries run on a rayon pool; the collect below is
    /// the single join barrier before outcomes become visible.
    pub fn execute(&mut self, parallel: bool) {
        let tables = &self.sample_data;

        let outcomes: Vec<QueryOutcome> = if parallel {
            self.queries
                .par_iter()
                .map(|query| Self::execute_single(query, tables))
                .collect()
        } else {
            self.queries
                .iter()
                .map(|query| Self::execute_single(query, tables))
                .collect()
        };

        debug!(
            "executed {} queries ({} errors)",
            outcomes.len(),
            outcomes.iter().filter(|o| o.is_error()).count()
        );

        self.results = outcomes.into_iter().map(Some).collect();
        self.with_status = true;
    }

    /// The recorded outcome of one query, if execution has run.
    pub fn outcome(&self, index: usize) -> Option<&QueryOutcome> {
        self.results.get(index).and_then(Option::as_ref)
    }

    /// Iterate (query, outcome) pairs in pool order. Restartable: each
    /// call yields a fresh iterator.
    pub fn items(&self) -> impl Iterator<Item = (&Query, Option<&QueryOutcome>)> {
        self.queries
            .iter()
            .zip(self.results.iter().map(Option::as_ref))
    }

    /// New pool restricted to queries whose outcome matches the filter.
    /// Outcomes stay aligned with their queries; requires execution to
    /// have run.
    pub fn filter(&self, filter: QueryFilter) -> PoolResult<QueryPool> {
        if !self.with_status {
            return Err(PoolError::NotExecuted);
        }

        let mut queries = Vec::new();
        let mut results = Vec::new();

        for (query, outcome) in self.queries.iter().zip(&self.results) {
            if let Some(outcome) = outcome {
                if filter.matches(outcome) {
                    queries.push(query.clone());
                    results.push(Some(outcome.clone()));
                }
            }
        }

        Ok(QueryPool {
            queries,
            structure: self.structure.clone(),
            sample_data: Arc::clone(&self.sample_data),
            results,
            with_status: true,
        })
    }

    /// Order queries by complexity, most complex first; stable for
    /// ties. Outcomes move with their queries.
    pub fn sort(&mut self) {
        let mut pairs: Vec<(Query, Option<QueryOutcome>)> = std::mem::take(&mut self.queries)
            .into_iter()
            .zip(std::mem::take(&mut self.results))
            .collect();

        pairs.sort_by_key(|(query, _)| std::cmp::Reverse(query.complexity()));

        (self.queries, self.results) = pairs.into_iter().unzip();
    }

    /// Aggregate statistics over the pool; see [`Statistics`].
    pub fn statistics(&self) -> Statistics {
        Statistics::gather(self)
    }

    /// Write the rendered query text to a file, one query per
    /// blank-line-separated record.
    pub fn save(&self, path: impl AsRef<Path>) -> PoolResult<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = std::fs::File::create(path)?;
        writeln!(file, "{}", self.rendered_queries().join("\n\n"))?;
        Ok(())
    }

    /// Write the statistics record as pretty JSON.
    pub fn save_statistics(&self, path: impl AsRef<Path>) -> PoolResult<()> {
        let json = serde_json::to_string_pretty(&self.statistics())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
