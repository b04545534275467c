use anyhow::Result;
use shoal::{ClusterClient, InfoArgs, InfoBroadcaster, InfoOutcome, InfoRequest};
use std::io::Write;

/// Run the info command, printing node responses to `out`
pub async fn run_info<C, W>(client: &C, args: InfoArgs, out: &mut W) -> Result<()>
where
    C: ClusterClient + ?Sized,
    W: Write,
{
    let request = InfoRequest::from_args(args)?;
    tracing::info!(mode = ?request.mode, "Sending info request");
    match InfoBroadcaster::new(client).broadcast(&request, out).await? {
        InfoOutcome::Answered(nodes) => tracing::debug!(nodes, "Info answered"),
        InfoOutcome::NoUsableResponse => tracing::warn!("No node returned usable info"),
    }
    Ok(())
}
