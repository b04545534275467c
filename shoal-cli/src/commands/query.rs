use anyhow::Result;
use shoal::{ClusterClient, QueryArgs, QueryDispatcher, QueryRequest};
use std::io::Write;

/// Run the query command, printing results to `out`
pub async fn run_query<C, W>(client: &C, args: QueryArgs, out: &mut W) -> Result<()>
where
    C: ClusterClient + ?Sized,
    W: Write,
{
    let request = QueryRequest::from_args(args)?;
    tracing::info!(
        namespace = %request.namespace,
        mode = request.mode().as_str(),
        "Running query"
    );
    let outcome = QueryDispatcher::new(client).dispatch(&request, out).await?;
    tracing::debug!(?outcome, "Query finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shoal::config::ClusterConfig;
    use shoal::{Key, Record};
    use shoal_cluster::MemoryCluster;

    fn cluster() -> MemoryCluster {
        let cluster = MemoryCluster::new(&ClusterConfig::default());
        for (key, n) in [("a", 1), ("b", 2)] {
            let bins = json!({ "n": n }).as_object().cloned().unwrap();
            cluster
                .put(Record::new(Key::new("test", None, key), bins))
                .unwrap();
        }
        cluster
    }

    #[tokio::test]
    async fn test_query_prints_records() {
        let mut out = Vec::new();
        run_query(
            &cluster(),
            QueryArgs {
                namespace: "test".into(),
                ..Default::default()
            },
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn test_conflicting_filters_abort() {
        let mut out = Vec::new();
        let err = run_query(
            &cluster(),
            QueryArgs {
                namespace: "test".into(),
                equal: Some(vec!["n".into(), "1".into()]),
                range: Some(vec!["n".into(), "1".into(), "2".into()]),
                ..Default::default()
            },
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
        assert!(out.is_empty());
    }
}
