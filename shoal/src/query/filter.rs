//! Secondary-index predicates

use crate::types::{Bins, Value};
use serde::{Deserialize, Serialize};

/// A predicate evaluated by the cluster against a secondary index.
///
/// Range bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Filter {
    Equal { bin: String, value: Value },
    Range { bin: String, start: i64, end: i64 },
}

impl Filter {
    pub fn equal(bin: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Equal {
            bin: bin.into(),
            value: value.into(),
        }
    }

    pub fn range(bin: impl Into<String>, start: i64, end: i64) -> Self {
        Filter::Range {
            bin: bin.into(),
            start,
            end,
        }
    }

    /// Bin the predicate is indexed on
    pub fn bin(&self) -> &str {
        match self {
            Filter::Equal { bin, .. } | Filter::Range { bin, .. } => bin,
        }
    }

    /// Evaluate the predicate against a record's bins.
    ///
    /// A missing bin never matches; range only matches integer bins.
    pub fn matches(&self, bins: &Bins) -> bool {
        match self {
            Filter::Equal { bin, value } => bins.get(bin).is_some_and(|v| v == value),
            Filter::Range { bin, start, end } => bins
                .get(bin)
                .and_then(Value::as_i64)
                .is_some_and(|v| *start <= v && v <= *end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bins(value: Value) -> Bins {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_equal_matches() {
        let filter = Filter::equal("x", 5);
        assert!(filter.matches(&bins(json!({"x": 5}))));
        assert!(!filter.matches(&bins(json!({"x": 6}))));
        assert!(!filter.matches(&bins(json!({"y": 5}))));
        assert!(!filter.matches(&bins(json!({"x": "5"}))));
    }

    #[test]
    fn test_equal_string() {
        let filter = Filter::equal("name", "alice");
        assert!(filter.matches(&bins(json!({"name": "alice"}))));
    }

    #[test]
    fn test_range_is_inclusive() {
        let filter = Filter::range("age", 18, 30);
        assert!(filter.matches(&bins(json!({"age": 18}))));
        assert!(filter.matches(&bins(json!({"age": 30}))));
        assert!(!filter.matches(&bins(json!({"age": 31}))));
        assert!(!filter.matches(&bins(json!({"age": "20"}))));
        assert_eq!(filter.bin(), "age");
    }

    #[test]
    fn test_empty_range_matches_nothing() {
        let filter = Filter::range("age", 10, 5);
        assert!(!filter.matches(&bins(json!({"age": 7}))));
    }
}
