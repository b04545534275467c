//! Namespace storage and query evaluation

use parking_lot::RwLock;
use shoal::config::NamespaceConfig;
use shoal::{Bins, Error, Filter, Query, Record, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Records of one namespace, ordered by digest
#[derive(Debug)]
struct Namespace {
    indexes: HashSet<String>,
    records: BTreeMap<Vec<u8>, Record>,
}

/// All namespaces of the embedded cluster
#[derive(Debug, Default)]
pub struct RecordStore {
    namespaces: RwLock<HashMap<String, Namespace>>,
}

impl RecordStore {
    pub fn new(namespaces: &[NamespaceConfig]) -> Self {
        let map = namespaces
            .iter()
            .map(|ns| {
                (
                    ns.name.clone(),
                    Namespace {
                        indexes: ns.indexes.iter().cloned().collect(),
                        records: BTreeMap::new(),
                    },
                )
            })
            .collect();
        Self {
            namespaces: RwLock::new(map),
        }
    }

    /// Insert or overwrite a record by digest
    pub fn put(&self, record: Record) -> Result<()> {
        let mut namespaces = self.namespaces.write();
        let ns = namespaces
            .get_mut(&record.key.namespace)
            .ok_or_else(|| Error::NamespaceNotFound(record.key.namespace.clone()))?;
        ns.records.insert(record.key.digest.clone(), record);
        Ok(())
    }

    /// Look up a record by digest
    pub fn get(&self, namespace: &str, digest: &[u8]) -> Option<Record> {
        self.namespaces
            .read()
            .get(namespace)
            .and_then(|ns| ns.records.get(digest).cloned())
    }

    /// Names of all namespaces, sorted
    pub fn namespace_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Total number of stored records
    pub fn object_count(&self) -> usize {
        self.namespaces.read().values().map(|ns| ns.records.len()).sum()
    }

    /// Matching records with the projection applied, in digest order
    pub fn scan(&self, query: &Query) -> Result<Vec<Record>> {
        let namespaces = self.namespaces.read();
        let ns = Self::resolve(&namespaces, query)?;
        let records: Vec<Record> = ns
            .records
            .values()
            .filter(|r| Self::matches(query, r))
            .map(|r| Record::new(r.key.clone(), project(&r.bins, &query.bins)))
            .collect();
        debug!(namespace = %query.namespace, matched = records.len(), "Scanned namespace");
        Ok(records)
    }

    /// Digests of matching records, in digest order
    pub fn matching_digests(&self, query: &Query) -> Result<Vec<Vec<u8>>> {
        let namespaces = self.namespaces.read();
        let ns = Self::resolve(&namespaces, query)?;
        Ok(ns
            .records
            .iter()
            .filter(|(_, r)| Self::matches(query, r))
            .map(|(digest, _)| digest.clone())
            .collect())
    }

    /// Mutate the bins of one record in place.
    ///
    /// Returns `Ok(false)` if the record vanished since it was matched.
    pub fn update<F>(&self, namespace: &str, digest: &[u8], f: F) -> Result<bool>
    where
        F: FnOnce(&mut Bins) -> Result<()>,
    {
        let mut namespaces = self.namespaces.write();
        let record = namespaces
            .get_mut(namespace)
            .and_then(|ns| ns.records.get_mut(digest));
        match record {
            Some(record) => {
                f(&mut record.bins)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn resolve<'a>(
        namespaces: &'a HashMap<String, Namespace>,
        query: &Query,
    ) -> Result<&'a Namespace> {
        let ns = namespaces
            .get(&query.namespace)
            .ok_or_else(|| Error::NamespaceNotFound(query.namespace.clone()))?;
        if let Some(filter) = &query.filter {
            if let Filter::Range { bin, start, end } = filter {
                if start > end {
                    return Err(Error::InvalidFilter(format!(
                        "range on '{}' has start {} after end {}",
                        bin, start, end
                    )));
                }
            }
            if !ns.indexes.contains(filter.bin()) {
                return Err(Error::IndexNotFound {
                    namespace: query.namespace.clone(),
                    bin: filter.bin().to_string(),
                });
            }
        }
        Ok(ns)
    }

    fn matches(query: &Query, record: &Record) -> bool {
        if let Some(set) = &query.set {
            if record.key.set.as_ref() != Some(set) {
                return false;
            }
        }
        query.filter.as_ref().map_or(true, |f| f.matches(&record.bins))
    }
}

/// Keep only the selected bins; an empty selection keeps everything
fn project(bins: &Bins, selected: &[String]) -> Bins {
    if selected.is_empty() {
        return bins.clone();
    }
    selected
        .iter()
        .filter_map(|name| bins.get(name).map(|v| (name.clone(), v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shoal::Key;

    fn store() -> RecordStore {
        let store = RecordStore::new(&[NamespaceConfig {
            name: "test".into(),
            indexes: vec!["age".into()],
        }]);
        for (key, set, age) in [("a", "people", 20), ("b", "people", 40), ("c", "pets", 3)] {
            let bins = json!({"age": age, "name": key}).as_object().cloned().unwrap();
            store
                .put(Record::new(Key::new("test", Some(set.into()), key), bins))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_scan_all() {
        let records = store().scan(&Query::new("test", None)).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_scan_set_and_filter() {
        let query =
            Query::new("test", Some("people".into())).with_filter(Filter::range("age", 30, 50));
        let records = store().scan(&query).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key.user_key.as_deref(), Some("b"));
    }

    #[test]
    fn test_projection() {
        let query = Query::new("test", None).select(["name", "missing"]);
        let records = store().scan(&query).unwrap();
        assert!(records.iter().all(|r| r.bins.len() == 1 && r.bins.contains_key("name")));
    }

    #[test]
    fn test_unknown_namespace() {
        let err = store().scan(&Query::new("nope", None)).unwrap_err();
        assert!(matches!(err, Error::NamespaceNotFound(ns) if ns == "nope"));
    }

    #[test]
    fn test_filter_requires_index() {
        let query = Query::new("test", None).with_filter(Filter::equal("name", "a"));
        let err = store().scan(&query).unwrap_err();
        assert_eq!(err.error_type(), "index_not_found");
    }

    #[test]
    fn test_inverted_range_rejected() {
        let query = Query::new("test", None).with_filter(Filter::range("age", 50, 30));
        let err = store().scan(&query).unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
        assert!(err.to_string().contains("start 50 after end 30"));

        let single = Query::new("test", None).with_filter(Filter::range("age", 40, 40));
        assert_eq!(store().scan(&single).unwrap().len(), 1);
    }

    #[test]
    fn test_update_and_counts() {
        let store = store();
        assert_eq!(store.object_count(), 3);
        assert_eq!(store.namespace_names(), vec!["test".to_string()]);

        let digest = Key::new("test", Some("pets".into()), "c").digest;
        let updated = store
            .update("test", &digest, |bins| {
                bins.insert("age".into(), json!(4));
                Ok(())
            })
            .unwrap();
        assert!(updated);
        assert_eq!(store.get("test", &digest).unwrap().bins["age"], json!(4));
        assert!(!store.update("test", b"missing", |_| Ok(())).unwrap());
    }
}
