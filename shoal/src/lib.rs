//! Shoal - query and info commands over a distributed record store
//!
//! The crate holds the command core; connecting to a cluster is somebody
//! else's job. Commands are given a [`ClusterClient`] and only drive it.
//!
//! # Components
//!
//! - **query**: owned [`Query`] builder, [`Filter`] predicates, [`UdfSpec`] parsing
//! - **dispatch**: [`QueryDispatcher`] choosing foreground / apply / background
//! - **stream**: record stream consumption and line formatting
//! - **info**: [`InfoBroadcaster`] for single-node and all-node info requests
//! - **command**: validation of raw argument bags into request structs
//!
//! # Example
//!
//! ```ignore
//! let request = QueryRequest::from_args(QueryArgs {
//!     namespace: "test".into(),
//!     equal: Some(vec!["x".into(), "5".into()]),
//!     ..Default::default()
//! })?;
//! let mut stdout = std::io::stdout().lock();
//! QueryDispatcher::new(&client).dispatch(&request, &mut stdout).await?;
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod info;
pub mod query;
pub mod stream;
pub mod types;

pub use client::{ClusterClient, RecordStream};
pub use command::{InfoArgs, QueryArgs, QueryRequest};
pub use config::Config;
pub use dispatch::{DispatchMode, QueryDispatcher, QueryOutcome};
pub use error::{Error, Result};
pub use info::{InfoBroadcaster, InfoMode, InfoOutcome, InfoRequest, INVALID_REQUEST};
pub use query::{Filter, Query, UdfSpec};
pub use types::{Bins, JobHandle, Key, NodeResponse, Record, Value};
