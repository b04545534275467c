use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shoal::config::LogFormat;
use shoal::{Config, InfoArgs, QueryArgs};
use shoal_cluster::MemoryCluster;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "shoal")]
#[command(about = "Shoal CLI - query and info commands for the cluster")]
#[command(version)]
struct Cli {
    /// Configuration file path (default: ~/.shoal/config.toml)
    #[arg(short, long, env = "SHOAL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log line format: text or json (overrides the config file)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a query and print the results
    Query {
        /// Namespace to query
        namespace: String,

        /// Set within the namespace
        set: Option<String>,

        /// List of bins to fetch for each record
        #[arg(long, num_args = 1..)]
        bins: Option<Vec<String>>,

        /// Applies an equal filter to the query
        #[arg(
            long,
            num_args = 2,
            value_names = ["BIN", "VALUE"],
            allow_negative_numbers = true,
            conflicts_with = "range"
        )]
        equal: Option<Vec<String>>,

        /// Applies a range filter to the query
        #[arg(
            long,
            num_args = 3,
            value_names = ["BIN", "START", "END"],
            allow_negative_numbers = true
        )]
        range: Option<Vec<String>>,

        /// UDF module, function & arguments to apply to the query
        #[arg(long, num_args = 1.., value_name = "ARG", allow_negative_numbers = true)]
        udf: Option<Vec<String>>,

        /// Run the query in the background (while applying UDF)
        #[arg(long)]
        background: bool,
    },

    /// Send an info request to the cluster
    Info {
        /// Info requests, sent as one newline-separated request
        #[arg(required = true)]
        requests: Vec<String>,

        /// Send request to a single, randomly selected cluster node
        #[arg(long, conflicts_with = "all")]
        any: bool,

        /// Send request to all cluster nodes (default)
        #[arg(long)]
        all: bool,
    },
}

fn init_tracing(level: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
    ));
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        cli.log_format.unwrap_or(config.logging.format),
    );
    tracing::debug!(config = %config_path.display(), "Configuration loaded");

    let cluster = MemoryCluster::from_config(&config.cluster)?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Query {
            namespace,
            set,
            bins,
            equal,
            range,
            udf,
            background,
        } => {
            let args = QueryArgs {
                namespace,
                set,
                bins,
                equal,
                range,
                udf,
                background,
            };
            commands::run_query(&cluster, args, &mut stdout).await?;
            // background jobs run on this runtime and stop with it
            cluster.drain_jobs().await;
        }
        Commands::Info { requests, any, all } => {
            commands::run_info(&cluster, InfoArgs { requests, any, all }, &mut stdout).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let cli = Cli::try_parse_from([
            "shoal", "query", "test", "demo", "--bins", "a", "b", "--range", "age", "-5", "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Query {
                namespace,
                set,
                bins,
                range,
                equal,
                ..
            } => {
                assert_eq!(namespace, "test");
                assert_eq!(set.as_deref(), Some("demo"));
                assert_eq!(bins, Some(vec!["a".to_string(), "b".to_string()]));
                assert_eq!(
                    range,
                    Some(vec!["age".to_string(), "-5".to_string(), "10".to_string()])
                );
                assert!(equal.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_equal_conflicts_with_range() {
        let result = Cli::try_parse_from([
            "shoal", "query", "test", "--equal", "x", "5", "--range", "x", "1", "9",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_udf_with_background() {
        let cli = Cli::try_parse_from([
            "shoal", "query", "test", "--udf", "mymod", "myfunc", "1", "--background",
        ])
        .unwrap();
        match cli.command {
            Commands::Query { udf, background, .. } => {
                assert_eq!(
                    udf,
                    Some(vec!["mymod".to_string(), "myfunc".to_string(), "1".to_string()])
                );
                assert!(background);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_info_flags() {
        let cli = Cli::try_parse_from(["shoal", "info", "build", "node", "--any"]).unwrap();
        match cli.command {
            Commands::Info { requests, any, all } => {
                assert_eq!(requests, vec!["build".to_string(), "node".to_string()]);
                assert!(any);
                assert!(!all);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["shoal", "info", "build", "--any", "--all"]).is_err());
        assert!(Cli::try_parse_from(["shoal", "info"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["shoal", "info", "node", "--config", "/tmp/shoal.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/shoal.toml")));
        assert!(cli.log_format.is_none());
    }

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::try_parse_from(["shoal", "--log-format", "json", "info", "node"]).unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(Cli::try_parse_from(["shoal", "--log-format", "xml", "info", "node"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
