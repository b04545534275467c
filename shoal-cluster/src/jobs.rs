//! Background job table

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::task::JoinHandle;
use tracing::warn;

/// Progress of a background job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed { processed: u64, failed: u64 },
}

struct JobEntry {
    status: JobStatus,
    handle: Option<JoinHandle<()>>,
}

/// Jobs submitted to the embedded cluster.
///
/// Entries are kept for the life of the table so finished jobs still report
/// their status; the CLI builds one cluster per invocation.
#[derive(Default)]
pub struct JobTable {
    jobs: Mutex<HashMap<u64, JobEntry>>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh random job id in the running state
    pub fn reserve(&self) -> u64 {
        let mut jobs = self.jobs.lock();
        loop {
            let id = rand::random::<u64>();
            if id != 0 && !jobs.contains_key(&id) {
                jobs.insert(
                    id,
                    JobEntry {
                        status: JobStatus::Running,
                        handle: None,
                    },
                );
                return id;
            }
        }
    }

    /// Attach the task driving a reserved job
    pub fn attach(&self, id: u64, handle: JoinHandle<()>) {
        if let Some(entry) = self.jobs.lock().get_mut(&id) {
            entry.handle = Some(handle);
        }
    }

    pub fn complete(&self, id: u64, processed: u64, failed: u64) {
        if let Some(entry) = self.jobs.lock().get_mut(&id) {
            entry.status = JobStatus::Completed { processed, failed };
        }
    }

    pub fn status(&self, id: u64) -> Option<JobStatus> {
        self.jobs.lock().get(&id).map(|e| e.status.clone())
    }

    /// Wait for the job's task to finish and return its final status
    pub async fn wait(&self, id: u64) -> Option<JobStatus> {
        let handle = self.jobs.lock().get_mut(&id)?.handle.take();
        if let Some(handle) = handle {
            // a panicked job leaves its status as Running
            let _ = handle.await;
        }
        self.status(id)
    }

    /// Await every job task still attached, including ones submitted while
    /// draining. Returns the number of tasks awaited.
    pub async fn drain(&self) -> usize {
        let mut drained = 0;
        loop {
            let handles: Vec<(u64, JoinHandle<()>)> = self
                .jobs
                .lock()
                .iter_mut()
                .filter_map(|(id, entry)| entry.handle.take().map(|h| (*id, h)))
                .collect();
            if handles.is_empty() {
                return drained;
            }
            drained += handles.len();
            for (id, handle) in handles {
                if let Err(e) = handle.await {
                    warn!(job_id = id, error = %e, "Background job task failed");
                }
            }
        }
    }
}
