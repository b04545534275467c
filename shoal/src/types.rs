//! Record, key and response types exchanged with the cluster client

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub use serde_json::Value;

/// Named fields of a record
pub type Bins = serde_json::Map<String, Value>;

/// Size of a record digest in bytes
pub const DIGEST_LEN: usize = 20;

/// Record key: optional user key plus the digest the cluster addresses it by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub namespace: String,
    pub set: Option<String>,
    pub user_key: Option<String>,
    pub digest: Vec<u8>,
}

impl Key {
    /// Create a key from a user key, computing its digest
    pub fn new(
        namespace: impl Into<String>,
        set: Option<String>,
        user_key: impl Into<String>,
    ) -> Self {
        let user_key = user_key.into();
        let digest = compute_digest(set.as_deref(), &user_key);
        Self {
            namespace: namespace.into(),
            set,
            user_key: Some(user_key),
            digest,
        }
    }

    /// Create a key known only by its digest
    pub fn from_digest(namespace: impl Into<String>, set: Option<String>, digest: Vec<u8>) -> Self {
        Self {
            namespace: namespace.into(),
            set,
            user_key: None,
            digest,
        }
    }

    /// Text used to identify the record in command output.
    ///
    /// The user key when one is stored, otherwise the hex digest.
    pub fn display_key(&self) -> String {
        match self.user_key.as_deref() {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => hex::encode(&self.digest),
        }
    }
}

/// Digest over the set name and user key
pub fn compute_digest(set: Option<&str>, user_key: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(set.unwrap_or("").as_bytes());
    hasher.update([0u8]);
    hasher.update(user_key.as_bytes());
    hasher.finalize()[..DIGEST_LEN].to_vec()
}

/// A record returned by a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: Key,
    #[serde(default)]
    pub bins: Bins,
}

impl Record {
    pub fn new(key: Key, bins: Bins) -> Self {
        Self { key, bins }
    }
}

/// Handle to a background job running on the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle {
    pub job_id: u64,
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.job_id)
    }
}

/// One node's answer to an info request.
///
/// `info` is `None` when the node had nothing usable to say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeResponse {
    pub node_id: String,
    pub info: Option<String>,
}

impl NodeResponse {
    pub fn new(node_id: impl Into<String>, info: Option<String>) -> Self {
        Self {
            node_id: node_id.into(),
            info,
        }
    }
}

/// Interpret a command-line argument as a value.
///
/// Integers first, then floats, anything else stays a string.
pub fn parse_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_key_prefers_user_key() {
        let key = Key::new("test", Some("demo".into()), "user-1");
        assert_eq!(key.display_key(), "user-1");
        assert_eq!(key.digest.len(), DIGEST_LEN);
    }

    #[test]
    fn test_display_key_falls_back_to_hex_digest() {
        let key = Key::from_digest("test", None, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(key.display_key(), "deadbeef");

        let mut empty = Key::new("test", None, "");
        empty.user_key = Some(String::new());
        assert_eq!(empty.display_key(), hex::encode(&empty.digest));
    }

    #[test]
    fn test_digest_depends_on_set() {
        assert_ne!(compute_digest(Some("a"), "k"), compute_digest(Some("b"), "k"));
        assert_eq!(compute_digest(None, "k"), compute_digest(Some(""), "k"));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("5"), json!(5));
        assert_eq!(parse_value("-12"), json!(-12));
        assert_eq!(parse_value("2.5"), json!(2.5));
        assert_eq!(parse_value("abc"), json!("abc"));
        assert_eq!(parse_value("NaN"), json!("NaN"));
    }

    #[test]
    fn test_job_handle_display() {
        assert_eq!(JobHandle { job_id: 42 }.to_string(), "42");
    }
}
