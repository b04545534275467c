//! Query construction
//!
//! A [`Query`] is an owned value built once per command: projection via
//! [`select_bins`], predicate via [`apply_filter`], then handed to the
//! dispatcher. Nothing here talks to the cluster.

mod filter;
mod udf;

pub use filter::Filter;
pub use udf::UdfSpec;

use serde::{Deserialize, Serialize};

/// Secondary-index query against a namespace and optional set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub namespace: String,
    pub set: Option<String>,
    /// Bins to return; empty means all bins
    #[serde(default)]
    pub bins: Vec<String>,
    pub filter: Option<Filter>,
}

impl Query {
    pub fn new(namespace: impl Into<String>, set: Option<String>) -> Self {
        Self {
            namespace: namespace.into(),
            set,
            bins: Vec::new(),
            filter: None,
        }
    }

    /// Restrict returned bins, keeping the given order
    pub fn select<I, S>(mut self, bins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bins = bins.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a predicate, replacing any previous one
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Whether every bin is returned
    pub fn selects_all_bins(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Apply a projection. An empty list leaves the query returning all bins.
pub fn select_bins(query: Query, bins: &[String]) -> Query {
    if bins.is_empty() {
        return query;
    }
    query.select(bins.iter().cloned())
}

/// Attach the predicate, if there is one
pub fn apply_filter(query: Query, filter: Option<&Filter>) -> Query {
    match filter {
        Some(filter) => query.with_filter(filter.clone()),
        None => query,
    }
}
