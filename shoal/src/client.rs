//! Cluster client capability surface
//!
//! The command layer never connects, authenticates or routes by itself; it
//! is handed something implementing [`ClusterClient`] and only drives it.

use crate::error::Result;
use crate::query::{Query, UdfSpec};
use crate::types::{JobHandle, NodeResponse, Record, Value};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Finite sequence of records, terminated by end-of-stream or the first error
pub type RecordStream<'a> = Pin<Box<dyn Stream<Item = Result<Record>> + Send + 'a>>;

/// Operations the commands need from a connected cluster client
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Start a foreground query, streaming matching records
    fn foreach(&self, query: &Query) -> RecordStream<'_>;

    /// Run an aggregation UDF over the query's records and return its result
    async fn apply(&self, query: &Query, udf: &UdfSpec) -> Result<Value>;

    /// Schedule a record UDF over the query's records without waiting for it
    async fn background(&self, query: &Query, udf: &UdfSpec) -> Result<JobHandle>;

    /// Send an info request to a single node picked by the client
    async fn info_any(&self, request: &str) -> Result<Option<String>>;

    /// Send an info request to every node
    async fn info_all(&self, request: &str) -> Result<Vec<NodeResponse>>;

    /// Name of the client implementation, for logs
    fn backend_name(&self) -> &'static str;
}
