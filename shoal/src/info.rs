//! Info request broadcast
//!
//! Sends raw info text to one node (`Any`) or every node (`All`) and prints
//! what came back. A node without a usable payload is not an error: it is
//! reported as [`INVALID_REQUEST`], once, when nobody answered.

use crate::client::ClusterClient;
use crate::error::Result;
use crate::types::NodeResponse;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::debug;

/// Printed when no node returned usable info
pub const INVALID_REQUEST: &str = "Invalid request";

/// Which nodes receive the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoMode {
    Any,
    #[default]
    All,
}

/// Validated info command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRequest {
    /// Request lines joined with `\n`
    pub text: String,
    pub mode: InfoMode,
}

impl InfoRequest {
    pub fn new(requests: &[String], mode: InfoMode) -> Self {
        Self {
            text: requests.join("\n"),
            mode,
        }
    }
}

/// What a broadcast produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoOutcome {
    /// Number of nodes whose info was printed
    Answered(usize),
    /// Nobody returned usable info
    NoUsableResponse,
}

/// Sends info requests through a cluster client
pub struct InfoBroadcaster<'a, C: ClusterClient + ?Sized> {
    client: &'a C,
}

impl<'a, C: ClusterClient + ?Sized> InfoBroadcaster<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn broadcast<W: Write>(
        &self,
        request: &InfoRequest,
        out: &mut W,
    ) -> Result<InfoOutcome> {
        debug!(mode = ?request.mode, backend = self.client.backend_name(), "Sending info request");
        match request.mode {
            InfoMode::Any => {
                let response = self.client.info_any(&request.text).await?;
                print_single(response.as_deref(), out)
            }
            InfoMode::All => {
                let responses = self.client.info_all(&request.text).await?;
                print_responses(&responses, out)
            }
        }
    }
}

/// Present-but-empty is still usable and prints an empty line
fn print_single<W: Write>(response: Option<&str>, out: &mut W) -> Result<InfoOutcome> {
    match response {
        Some(text) => {
            writeln!(out, "{}", text.trim())?;
            Ok(InfoOutcome::Answered(1))
        }
        None => {
            writeln!(out, "{}", INVALID_REQUEST)?;
            Ok(InfoOutcome::NoUsableResponse)
        }
    }
}

/// Nodes without info are skipped; client order is kept
fn print_responses<W: Write>(responses: &[NodeResponse], out: &mut W) -> Result<InfoOutcome> {
    let mut answered = 0;
    for response in responses {
        if let Some(info) = &response.info {
            writeln!(out, "{}:", response.node_id)?;
            writeln!(out, "{}", info.trim())?;
            answered += 1;
        } else {
            debug!(node = %response.node_id, "Node returned no info");
        }
    }

    if answered == 0 {
        writeln!(out, "{}", INVALID_REQUEST)?;
        return Ok(InfoOutcome::NoUsableResponse);
    }
    Ok(InfoOutcome::Answered(answered))
}
