//! Configuration management
//!
//! Default config location: ~/.shoal/config.toml

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Embedded cluster the commands run against
    #[serde(default)]
    pub cluster: ClusterConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}' (expected text or json)", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusterConfig {
    #[serde(default = "default_nodes")]
    pub nodes: Vec<NodeConfig>,

    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<NamespaceConfig>,

    /// JSON-lines file of records loaded at start-up
    pub seed_file: Option<PathBuf>,

    /// Upper bound on concurrent per-node info requests
    #[serde(default = "default_max_concurrent_info")]
    pub max_concurrent_info: usize,
}

fn default_nodes() -> Vec<NodeConfig> {
    (1..=3).map(|i| NodeConfig::new(format!("node-{}", i))).collect()
}

fn default_namespaces() -> Vec<NamespaceConfig> {
    vec![NamespaceConfig {
        name: "test".to_string(),
        indexes: Vec::new(),
    }]
}

fn default_max_concurrent_info() -> usize {
    16
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            namespaces: default_namespaces(),
            seed_file: None,
            max_concurrent_info: default_max_concurrent_info(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NodeConfig {
    pub id: String,

    /// Static info values keyed by request name
    #[serde(default)]
    pub info: BTreeMap<String, String>,

    /// Unreachable nodes answer nothing
    #[serde(default = "default_reachable")]
    pub reachable: bool,
}

fn default_reachable() -> bool {
    true
}

impl NodeConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            info: BTreeMap::new(),
            reachable: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NamespaceConfig {
    pub name: String,

    /// Bins carrying a secondary index
    #[serde(default)]
    pub indexes: Vec<String>,
}

impl Config {
    /// Load config from a file, falling back to defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load(path)
    }

    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.resolve_paths(path.parent());
        config.validate()?;
        Ok(config)
    }

    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".shoal")
            .join("config.toml")
    }

    /// Seed file paths are relative to the config file
    fn resolve_paths(&mut self, base: Option<&Path>) {
        if let (Some(seed), Some(base)) = (self.cluster.seed_file.as_ref(), base) {
            if seed.is_relative() {
                self.cluster.seed_file = Some(base.join(seed));
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.cluster.nodes.is_empty() {
            return Err(Error::Config("cluster.nodes must not be empty".into()));
        }
        if self.cluster.max_concurrent_info == 0 {
            return Err(Error::Config("cluster.max_concurrent_info must be > 0".into()));
        }
        let mut ids: Vec<&str> = self.cluster.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::Config("cluster node ids must be unique".into()));
        }
        Ok(())
    }
}
