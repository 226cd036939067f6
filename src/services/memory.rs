//! In-memory venue store for tests and local development.

use crate::models::VenueRecord;
use crate::services::error::ServiceError;
use crate::services::store::{decode_record, VenueQuery, VenueStore};
use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::path::Path;

/// Venue store backed by a fixed list of documents
///
/// Predicates are evaluated the way the document store evaluates them, in
/// insertion order, so query results are deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryVenueStore {
    records: Vec<VenueRecord>,
}

impl MemoryVenueStore {
    pub fn new(records: Vec<VenueRecord>) -> Self {
        Self { records }
    }

    /// Load documents from a JSON file holding an array of venue documents
    ///
    /// Plain and typed-value documents are both accepted; documents that do
    /// not decode are skipped.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let docs: Vec<Value> = serde_json::from_str(&raw)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(Self::new(docs.into_iter().filter_map(decode_record).collect()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl VenueStore for MemoryVenueStore {
    async fn query(&self, query: &VenueQuery) -> Result<Vec<VenueRecord>, ServiceError> {
        Ok(self
            .records
            .iter()
            .filter(|r| query.matches(r))
            .take(query.limit())
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::Predicate;
    use std::io::Write;

    fn venue(id: &str, district: &str) -> VenueRecord {
        VenueRecord {
            id: Some(id.to_string()),
            district: Some(district.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_query_filters_and_caps() {
        let store = MemoryVenueStore::new(vec![
            venue("1", "Khazar"),
            venue("2", "Sabail"),
            venue("3", "Khazar"),
            venue("4", "Khazar"),
        ]);

        let query = VenueQuery::unfiltered(2)
            .with(Predicate::Equals { field: "district", value: "Khazar".into() });

        let ids: Vec<_> = store
            .query(&query)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|r| r.id)
            .collect();

        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "a", "district": "Nizami"}},
                {{"fields": {{"id": {{"stringValue": "b"}}, "capacity_max": {{"integerValue": "120"}}}}}},
                {{"capacity_min": "broken"}}
            ]"#
        )
        .unwrap();

        let store = MemoryVenueStore::from_json_file(file.path()).unwrap();
        assert_eq!(store.len(), 2);
    }
}
