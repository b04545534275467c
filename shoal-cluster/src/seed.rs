//! JSON-lines seed data
//!
//! One record per line:
//!
//! ```text
//! {"namespace": "test", "set": "demo", "key": "k1", "bins": {"x": 5}}
//! ```

use serde::Deserialize;
use shoal::{Bins, Error, Key, Record, Result, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SeedRecord {
    namespace: String,
    set: Option<String>,
    key: Value,
    #[serde(default)]
    bins: Bins,
}

impl SeedRecord {
    fn into_record(self, line: usize) -> Result<Record> {
        let user_key = match self.key {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                return Err(Error::Config(format!(
                    "seed line {}: key must be a string or number, got {}",
                    line, other
                )))
            }
        };
        Ok(Record::new(Key::new(self.namespace, self.set, user_key), self.bins))
    }
}

/// Parse seed records from a reader; blank lines and `#` comments are skipped
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let seed: SeedRecord = serde_json::from_str(trimmed)
            .map_err(|e| Error::Config(format!("seed line {}: {}", idx + 1, e)))?;
        records.push(seed.into_record(idx + 1)?);
    }
    Ok(records)
}

/// Load seed records from a file
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)?;
    read_records(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_records() {
        let input = r#"
# people
{"namespace": "test", "set": "demo", "key": "k1", "bins": {"x": 5}}
{"namespace": "test", "key": 42}
"#;
        let records = read_records(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key.user_key.as_deref(), Some("k1"));
        assert_eq!(records[0].key.set.as_deref(), Some("demo"));
        assert_eq!(records[0].bins["x"], json!(5));
        assert_eq!(records[1].key.user_key.as_deref(), Some("42"));
        assert!(records[1].bins.is_empty());
    }

    #[test]
    fn test_bad_line_reports_position() {
        let input = "{\"namespace\": \"test\", \"key\": \"a\"}\nnot json\n";
        let err = read_records(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("seed line 2"));
    }

    #[test]
    fn test_key_type_checked() {
        let input = r#"{"namespace": "test", "key": [1]}"#;
        assert!(read_records(input.as_bytes()).unwrap_err().is_config());
    }
}
