//! Info endpoint of an embedded node
//!
//! Each request line is a command name. A node answers the lines it knows
//! as `name\tvalue` and ignores the rest; if it knows none of them the
//! answer is `None`.

use shoal::config::NodeConfig;
use std::collections::BTreeMap;

/// Cluster-wide facts a node can report
#[derive(Debug, Clone, Default)]
pub struct InfoContext {
    pub namespaces: Vec<String>,
    pub objects: usize,
}

#[derive(Debug, Clone)]
pub struct MemoryNode {
    id: String,
    info: BTreeMap<String, String>,
    reachable: bool,
}

impl MemoryNode {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            id: config.id.clone(),
            info: config.info.clone(),
            reachable: config.reachable,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Answer an info request, `None` when nothing in it is known
    pub fn answer(&self, request: &str, ctx: &InfoContext) -> Option<String> {
        if !self.reachable {
            return None;
        }
        let mut lines = Vec::new();
        for name in request.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(value) = self.lookup(name, ctx) {
                lines.push(format!("{}\t{}", name, value));
            }
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n") + "\n")
        }
    }

    /// Configured values take precedence over built-in ones
    fn lookup(&self, name: &str, ctx: &InfoContext) -> Option<String> {
        if let Some(value) = self.info.get(name) {
            return Some(value.clone());
        }
        match name {
            "node" => Some(self.id.clone()),
            "build" => Some(env!("CARGO_PKG_VERSION").to_string()),
            "namespaces" => Some(ctx.namespaces.join(";")),
            "statistics" => Some(format!(
                "objects={};namespaces={}",
                ctx.objects,
                ctx.namespaces.len()
            )),
            _ => None,
        }
    }
}
