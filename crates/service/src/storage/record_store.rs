use async_trait::async_trait;

use super::StoreError;

/// Keyed record storage.
/// Implementations can be a JSON document, an embedded key-value engine, or
/// memory; callers only see `get/put/delete/list`.
#[async_trait]
pub trait RecordStore<V: Send + 'static>: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<V>, StoreError>;
    async fn put(&self, key: &str, record: V) -> Result<(), StoreError>;
    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
    async fn list(&self) -> Result<Vec<(String, V)>, StoreError>;
}

/// In-memory store for tests and benchmarks
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use tokio::sync::RwLock;

    pub struct MemoryRecordStore<V> {
        records: RwLock<BTreeMap<String, V>>,
    }

    impl<V> Default for MemoryRecordStore<V> {
        fn default() -> Self {
            Self { records: RwLock::new(BTreeMap::new()) }
        }
    }

    #[async_trait]
    impl<V: Clone + Send + Sync + 'static> RecordStore<V> for MemoryRecordStore<V> {
        async fn get(&self, key: &str) -> Result<Option<V>, StoreError> {
            Ok(self.records.read().await.get(key).cloned())
        }

        async fn put(&self, key: &str, record: V) -> Result<(), StoreError> {
            self.records.write().await.insert(key.to_string(), record);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<bool, StoreError> {
            Ok(self.records.write().await.remove(key).is_some())
        }

        async fn list(&self) -> Result<Vec<(String, V)>, StoreError> {
            let records = self.records.read().await;
            Ok(records.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        }
    }
}
