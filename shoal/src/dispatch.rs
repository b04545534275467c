//! Query dispatch
//!
//! Picks one of three execution modes per invocation and drives it to
//! completion:
//!
//! ```text
//! udf?  background?   mode
//! no    -             Foreground  (stream + print records)
//! yes   no            Apply       (one aggregate value)
//! yes   yes           Background  (job id, not awaited)
//! ```
//!
//! Client failures are returned unchanged. Nothing is retried.

use crate::client::ClusterClient;
use crate::command::QueryRequest;
use crate::error::Result;
use crate::query::{Query, UdfSpec};
use crate::stream::consume_records;
use crate::types::{JobHandle, Value};
use std::io::Write;
use tracing::{debug, info};

/// Execution mode of a query command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Foreground,
    Apply,
    Background,
}

impl DispatchMode {
    /// UDF presence decides first; the background flag only matters with a UDF
    pub fn select(udf: Option<&UdfSpec>, background: bool) -> Self {
        match (udf, background) {
            (None, _) => DispatchMode::Foreground,
            (Some(_), false) => DispatchMode::Apply,
            (Some(_), true) => DispatchMode::Background,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchMode::Foreground => "foreground",
            DispatchMode::Apply => "apply",
            DispatchMode::Background => "background",
        }
    }
}

/// What a completed dispatch produced
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Streamed { records: u64 },
    Applied(Value),
    Submitted(JobHandle),
}

/// Drives a query request against a cluster client
pub struct QueryDispatcher<'a, C: ClusterClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: ClusterClient + ?Sized> QueryDispatcher<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Build the query, run it in the selected mode and print its output
    pub async fn dispatch<W: Write>(
        &self,
        request: &QueryRequest,
        out: &mut W,
    ) -> Result<QueryOutcome> {
        let query = request.build_query();
        let mode = request.mode();
        debug!(
            namespace = %query.namespace,
            set = ?query.set,
            filter = ?query.filter,
            mode = mode.as_str(),
            backend = self.client.backend_name(),
            "Dispatching query"
        );

        match (mode, request.udf.as_ref()) {
            (DispatchMode::Apply, Some(udf)) => self.run_apply(&query, udf, out).await,
            (DispatchMode::Background, Some(udf)) => self.run_background(&query, udf, out).await,
            _ => self.run_foreground(&query, out).await,
        }
    }

    async fn run_foreground<W: Write>(&self, query: &Query, out: &mut W) -> Result<QueryOutcome> {
        let stream = self.client.foreach(query);
        let records = consume_records(stream, out).await?;
        Ok(QueryOutcome::Streamed { records })
    }

    async fn run_apply<W: Write>(
        &self,
        query: &Query,
        udf: &UdfSpec,
        out: &mut W,
    ) -> Result<QueryOutcome> {
        let result = self.client.apply(query, udf).await?;
        writeln!(out, "Query result: {}", result)?;
        Ok(QueryOutcome::Applied(result))
    }

    async fn run_background<W: Write>(
        &self,
        query: &Query,
        udf: &UdfSpec,
        out: &mut W,
    ) -> Result<QueryOutcome> {
        let job = self.client.background(query, udf).await?;
        info!(job_id = job.job_id, udf = %udf, "Background query submitted");
        writeln!(out, "Running query in background - Job ID: {}", job)?;
        Ok(QueryOutcome::Submitted(job))
    }
}
