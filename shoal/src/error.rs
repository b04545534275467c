//! Error types shared by the query and info command paths

use thiserror::Error;

/// Errors surfaced by command construction or by the cluster client.
///
/// Anything other than [`Error::Config`] comes from the client and is passed
/// through the dispatcher untouched.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("No secondary index on bin '{bin}' in namespace '{namespace}'")]
    IndexNotFound { namespace: String, bin: String },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("UDF not found: {module}.{function}")]
    UdfNotFound { module: String, function: String },

    #[error("UDF error in {module}.{function}: {reason}")]
    Udf {
        module: String,
        function: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the error type as a string for metrics labeling
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Transport(_) => "transport",
            Error::Stream(_) => "stream",
            Error::NamespaceNotFound(_) => "namespace_not_found",
            Error::IndexNotFound { .. } => "index_not_found",
            Error::InvalidFilter(_) => "invalid_filter",
            Error::UdfNotFound { .. } => "udf_not_found",
            Error::Udf { .. } => "udf",
            Error::Io(_) => "io",
        }
    }

    /// Whether the error was raised before anything reached the cluster
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
