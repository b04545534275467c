//! Scripted cluster client for exercising the command core

#![allow(dead_code)]

use async_trait::async_trait;
use shoal::{
    ClusterClient, Error, JobHandle, Key, NodeResponse, Query, Record, RecordStream, Result,
    UdfSpec, Value,
};
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedClient {
    pub records: Vec<Record>,
    /// Emit a stream error after this many records
    pub fail_after: Option<usize>,
    pub apply_result: Option<Value>,
    pub apply_error: Option<String>,
    pub job_id: u64,
    pub any_response: Option<String>,
    pub all_responses: Vec<NodeResponse>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

pub fn record(key: &str, bins: Value) -> Record {
    Record::new(
        Key::new("test", None, key),
        bins.as_object().cloned().unwrap_or_default(),
    )
}

#[async_trait]
impl ClusterClient for ScriptedClient {
    fn foreach(&self, query: &Query) -> RecordStream<'_> {
        self.log(format!("foreach {}", query.namespace));
        let mut items: Vec<Result<Record>> = Vec::new();
        for (i, rec) in self.records.iter().enumerate() {
            if self.fail_after == Some(i) {
                items.push(Err(Error::Stream("connection reset".into())));
                break;
            }
            items.push(Ok(rec.clone()));
        }
        Box::pin(futures::stream::iter(items))
    }

    async fn apply(&self, _query: &Query, udf: &UdfSpec) -> Result<Value> {
        self.log(format!("apply {}", udf));
        if let Some(reason) = &self.apply_error {
            return Err(Error::Transport(reason.clone()));
        }
        Ok(self.apply_result.clone().unwrap_or(Value::Null))
    }

    async fn background(&self, _query: &Query, udf: &UdfSpec) -> Result<JobHandle> {
        self.log(format!("background {}", udf));
        Ok(JobHandle {
            job_id: self.job_id,
        })
    }

    async fn info_any(&self, request: &str) -> Result<Option<String>> {
        self.log(format!("info_any {}", request));
        Ok(self.any_response.clone())
    }

    async fn info_all(&self, request: &str) -> Result<Vec<NodeResponse>> {
        self.log(format!("info_all {}", request));
        Ok(self.all_responses.clone())
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}
