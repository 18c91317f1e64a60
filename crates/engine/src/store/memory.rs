//! In-process [`RecordStore`] used by tests and local development.
//!
//! Records live in a map keyed by collection id and keep insertion order.
//! Failures can be injected to exercise the error paths of the ledgers.
use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Filter, Properties, RecordId, RecordStore, RemoteRecord};
use crate::StoreError;

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<String, Vec<RemoteRecord>>,
    next_id: u64,
    creates: usize,
    updates: usize,
    fail_creates: bool,
    fail_queries: bool,
    updates_before_failure: Option<usize>,
}

impl MemoryState {
    fn find_mut(&mut self, id: &RecordId) -> Option<&mut RemoteRecord> {
        self.collections
            .values_mut()
            .flat_map(|records| records.iter_mut())
            .find(|record| &record.id == id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw record as if another client had written it.
    pub async fn seed(&self, collection: &str, properties: Properties) -> RecordId {
        let mut guard = self.inner.lock().await;
        guard.next_id += 1;
        let id = RecordId::new(format!("mem-{}", guard.next_id));
        guard
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(RemoteRecord {
                id: id.clone(),
                properties,
            });
        id
    }

    /// All records of a collection, archived ones included.
    pub async fn records(&self, collection: &str) -> Vec<RemoteRecord> {
        let guard = self.inner.lock().await;
        guard
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of successful create calls.
    pub async fn create_calls(&self) -> usize {
        self.inner.lock().await.creates
    }

    /// Number of successful update calls.
    pub async fn update_calls(&self) -> usize {
        self.inner.lock().await.updates
    }

    pub async fn fail_creates(&self, fail: bool) {
        self.inner.lock().await.fail_creates = fail;
    }

    pub async fn fail_queries(&self, fail: bool) {
        self.inner.lock().await.fail_queries = fail;
    }

    /// Let `count` more updates succeed, then reject every following one.
    /// `None` disables the injection.
    pub async fn fail_updates_after(&self, count: Option<usize>) {
        self.inner.lock().await.updates_before_failure = count;
    }
}

fn unavailable() -> StoreError {
    StoreError::Unreachable("memory store offline".to_string())
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_record(
        &self,
        collection: &str,
        properties: Properties,
    ) -> Result<RecordId, StoreError> {
        {
            let mut guard = self.inner.lock().await;
            if guard.fail_creates {
                return Err(unavailable());
            }
            guard.creates += 1;
        }
        Ok(self.seed(collection, properties).await)
    }

    async fn query_all(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<RemoteRecord>, StoreError> {
        let guard = self.inner.lock().await;
        if guard.fail_queries {
            return Err(unavailable());
        }
        let records = guard
            .collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| filter.is_none_or(|f| f.matches(record)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn update_record(
        &self,
        id: &RecordId,
        properties: Properties,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.lock().await;
        if let Some(left) = guard.updates_before_failure.as_mut() {
            if *left == 0 {
                return Err(unavailable());
            }
            *left -= 1;
        }

        let record = guard.find_mut(id).ok_or_else(|| StoreError::Rejected {
            status: 404,
            message: format!("page {id} not found"),
        })?;
        record.properties.extend(properties);
        guard.updates += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyValue;

    fn archived(value: bool) -> Properties {
        Properties::from([("Archived".to_string(), PropertyValue::Checkbox(value))])
    }

    #[tokio::test]
    async fn query_applies_filter() {
        let store = MemoryStore::new();
        store.seed("db", archived(false)).await;
        store.seed("db", archived(true)).await;

        let filter = Filter::CheckboxEquals {
            property: "Archived".to_string(),
            value: false,
        };
        let active = store.query_all("db", Some(&filter)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(store.query_all("db", None).await.unwrap().len(), 2);
        assert!(store.query_all("other", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_properties() {
        let store = MemoryStore::new();
        let id = store.seed("db", archived(false)).await;
        store.update_record(&id, archived(true)).await.unwrap();

        let records = store.records("db").await;
        assert_eq!(records[0].checkbox("Archived"), Some(true));
        assert_eq!(store.update_calls().await, 1);
    }

    #[tokio::test]
    async fn update_unknown_page_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .update_record(&RecordId::new("nope"), archived(true))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 404, .. }));
    }

    #[tokio::test]
    async fn injected_update_failure_after_budget() {
        let store = MemoryStore::new();
        let first = store.seed("db", archived(false)).await;
        let second = store.seed("db", archived(false)).await;
        store.fail_updates_after(Some(1)).await;

        assert!(store.update_record(&first, archived(true)).await.is_ok());
        assert!(store.update_record(&second, archived(true)).await.is_err());
    }
}
