//! Shoal Cluster - embedded in-process cluster backend
//!
//! Implements [`shoal::ClusterClient`] without any network: a fixed set of
//! nodes answer info requests, one shared store holds the records, and UDFs
//! are plain Rust functions.
//!
//! # Architecture
//!
//! - **Store**: per-namespace records ordered by digest, secondary indexes by bin name
//! - **Nodes**: info endpoints answering `name\tvalue` lines, optionally unreachable
//! - **UDFs**: registry of aggregations (apply) and record functions (background)
//! - **Jobs**: background work spawned on the tokio runtime, tracked by job id
//! - **Seed**: JSON-lines record loading at start-up

pub mod jobs;
pub mod metrics;
pub mod node;
pub mod seed;
pub mod store;
pub mod udf;

mod cluster;

pub use cluster::MemoryCluster;
pub use jobs::JobStatus;
pub use node::MemoryNode;
pub use udf::{UdfRegistry, UdfResult};
