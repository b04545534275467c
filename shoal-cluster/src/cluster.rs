//! In-process cluster implementing [`ClusterClient`]

use crate::jobs::{JobStatus, JobTable};
use crate::metrics::{self, QueryTimer};
use crate::node::{InfoContext, MemoryNode};
use crate::seed;
use crate::store::RecordStore;
use crate::udf::{udf_error, UdfRegistry};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use shoal::config::ClusterConfig;
use shoal::{
    ClusterClient, Error, JobHandle, Key, NodeResponse, Query, Record, RecordStream, Result,
    UdfSpec, Value,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Embedded cluster: a fixed set of nodes sharing one record store
pub struct MemoryCluster {
    nodes: Vec<MemoryNode>,
    store: Arc<RecordStore>,
    udfs: UdfRegistry,
    jobs: Arc<JobTable>,
    semaphore: Arc<Semaphore>,
}

impl MemoryCluster {
    /// Create an empty cluster from configuration
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            nodes: config.nodes.iter().map(MemoryNode::new).collect(),
            store: Arc::new(RecordStore::new(&config.namespaces)),
            udfs: UdfRegistry::with_builtins(),
            jobs: Arc::new(JobTable::new()),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_info.max(1))),
        }
    }

    /// Create a cluster and load the configured seed file, if any
    pub fn from_config(config: &ClusterConfig) -> Result<Self> {
        let cluster = Self::new(config);
        if let Some(path) = &config.seed_file {
            let records = seed::load_records(path)?;
            let count = records.len();
            for record in records {
                cluster.put(record)?;
            }
            info!(path = %path.display(), records = count, "Loaded seed records");
        }
        Ok(cluster)
    }

    /// Insert or overwrite a record
    pub fn put(&self, record: Record) -> Result<()> {
        self.store.put(record)
    }

    pub fn get(&self, key: &Key) -> Option<Record> {
        self.store.get(&key.namespace, &key.digest)
    }

    /// Registry for adding custom UDFs
    pub fn udfs(&self) -> &UdfRegistry {
        &self.udfs
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(MemoryNode::id).collect()
    }

    pub fn job_status(&self, job_id: u64) -> Option<JobStatus> {
        self.jobs.status(job_id)
    }

    /// Wait until a background job has finished
    pub async fn wait_for_job(&self, job_id: u64) -> Option<JobStatus> {
        self.jobs.wait(job_id).await
    }

    /// Wait for every submitted background job to finish.
    ///
    /// Jobs run on the caller's runtime, so an embedding process must drain
    /// before that runtime shuts down or the work is cut short.
    pub async fn drain_jobs(&self) -> usize {
        let drained = self.jobs.drain().await;
        if drained > 0 {
            info!(jobs = drained, "Background jobs drained");
        }
        drained
    }

    fn info_context(&self) -> InfoContext {
        InfoContext {
            namespaces: self.store.namespace_names(),
            objects: self.store.object_count(),
        }
    }

    fn run_apply(&self, query: &Query, udf: &UdfSpec) -> Result<Value> {
        let records = self.store.scan(query)?;
        let aggregate = self.udfs.aggregate(udf)?;
        debug!(udf = %udf, records = records.len(), "Applying aggregation");
        aggregate(&records, &udf.args).map_err(|reason| udf_error(udf, reason))
    }

    fn submit(&self, query: &Query, udf: &UdfSpec) -> Result<JobHandle> {
        let record_fn = self.udfs.record_fn(udf)?;
        let digests = self.store.matching_digests(query)?;
        let job_id = self.jobs.reserve();

        let store = Arc::clone(&self.store);
        let jobs = Arc::clone(&self.jobs);
        let namespace = query.namespace.clone();
        let udf = udf.clone();

        let handle = tokio::spawn(async move {
            let mut processed = 0u64;
            let mut failed = 0u64;
            for digest in digests {
                let outcome = store.update(&namespace, &digest, |bins| {
                    // apply to a copy so a failing UDF leaves the record untouched
                    let mut next = bins.clone();
                    record_fn(&mut next, &udf.args).map_err(|reason| udf_error(&udf, reason))?;
                    *bins = next;
                    Ok(())
                });
                match outcome {
                    Ok(true) => processed += 1,
                    Ok(false) => {}
                    Err(e) => {
                        failed += 1;
                        warn!(job_id, error = %e, "Record UDF failed");
                    }
                }
                tokio::task::yield_now().await;
            }
            jobs.complete(job_id, processed, failed);
            metrics::record_job("completed");
            info!(job_id, processed, failed, udf = %udf, "Background job finished");
        });
        self.jobs.attach(job_id, handle);
        metrics::record_job("submitted");

        Ok(JobHandle { job_id })
    }
}

#[async_trait]
impl ClusterClient for MemoryCluster {
    fn foreach(&self, query: &Query) -> RecordStream<'_> {
        let query = query.clone();
        Box::pin(async_stream::stream! {
            let timer = QueryTimer::new("foreground");
            match self.store.scan(&query) {
                Ok(records) => {
                    let mut streamed = 0u64;
                    for record in records {
                        streamed += 1;
                        yield Ok(record);
                    }
                    metrics::record_records_streamed(streamed);
                    timer.success();
                }
                Err(e) => {
                    timer.error(e.error_type());
                    yield Err(e);
                }
            }
        })
    }

    async fn apply(&self, query: &Query, udf: &UdfSpec) -> Result<Value> {
        let timer = QueryTimer::new("apply");
        let result = self.run_apply(query, udf);
        match &result {
            Ok(_) => timer.success(),
            Err(e) => timer.error(e.error_type()),
        }
        result
    }

    async fn background(&self, query: &Query, udf: &UdfSpec) -> Result<JobHandle> {
        let timer = QueryTimer::new("background");
        let result = self.submit(query, udf);
        match &result {
            Ok(_) => timer.success(),
            Err(e) => timer.error(e.error_type()),
        }
        result
    }

    async fn info_any(&self, request: &str) -> Result<Option<String>> {
        let reachable: Vec<&MemoryNode> = self.nodes.iter().filter(|n| n.is_reachable()).collect();
        let node = reachable
            .choose(&mut rand::thread_rng())
            .copied()
            .ok_or_else(|| Error::Transport("no reachable cluster node".into()))?;
        debug!(node = node.id(), "Selected node for info request");

        let answer = node.answer(request, &self.info_context());
        metrics::record_info_request("any", usize::from(answer.is_some()));
        Ok(answer)
    }

    async fn info_all(&self, request: &str) -> Result<Vec<NodeResponse>> {
        let ctx = self.info_context();
        let ctx = &ctx;

        let futures: Vec<_> = self
            .nodes
            .iter()
            .map(|node| {
                let semaphore = Arc::clone(&self.semaphore);
                async move {
                    let _permit = semaphore.acquire().await.ok();
                    let info = node.answer(request, ctx);
                    if info.is_none() {
                        debug!(node = node.id(), "Node returned no usable info");
                    }
                    NodeResponse::new(node.id(), info)
                }
            })
            .collect();

        let responses = futures::future::join_all(futures).await;
        let answered = responses.iter().filter(|r| r.info.is_some()).count();
        debug!(nodes = responses.len(), answered, "Info fan-out complete");
        metrics::record_info_request("all", answered);
        Ok(responses)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
