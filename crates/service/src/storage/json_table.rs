use std::{
    collections::BTreeMap,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{json_file, RecordStore, StoreError};

/// Full table as persisted: one JSON object keyed by record key.
pub type Table<V> = BTreeMap<String, V>;

/// Keyed records persisted as a single JSON object document.
///
/// Nothing is cached: every call reads the whole document, and every write
/// rewrites it. The file is created lazily on the first write and an absent
/// file reads as an empty table. Writes issued through one `JsonTable` are
/// serialized for the whole load-mutate-save cycle; writers in other
/// processes are not coordinated.
///
/// Records are decoded one at a time. A record that does not decode as `V`
/// is reported when asked for by key, skipped by `list`, and written back
/// verbatim when other keys change.
pub struct JsonTable<V> {
    file_path: PathBuf,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> V>,
}

impl<V> JsonTable<V>
where
    V: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self, StoreError> {
        let file_path = path.into();
        json_file::ensure_json_path(&file_path)?;
        Ok(Self { file_path, write_lock: Mutex::new(()), _records: PhantomData })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Undecoded table; empty when the document is absent or not JSON.
    async fn load_raw(&self) -> Result<Table<Value>, StoreError> {
        json_file::load(&self.file_path, Table::new()).await
    }

    fn decode(&self, key: &str, raw: Value) -> Result<V, StoreError> {
        serde_json::from_value(raw).map_err(|e| {
            warn!(path = %self.file_path.display(), key, error = %e, "record does not decode");
            StoreError::schema(&self.file_path, e)
        })
    }

    /// Every record that decodes, keyed as stored.
    pub async fn load_table(&self) -> Result<Table<V>, StoreError> {
        let raw = self.load_raw().await?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| self.decode(&key, value).ok().map(|v| (key, v)))
            .collect())
    }
}

#[async_trait]
impl<V> RecordStore<V> for JsonTable<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>, StoreError> {
        let mut raw = self.load_raw().await?;
        raw.remove(key).map(|value| self.decode(key, value)).transpose()
    }

    async fn put(&self, key: &str, record: V) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.load_raw().await?;
        raw.insert(key.to_string(), serde_json::to_value(record)?);
        json_file::save(&self.file_path, &raw).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut raw = self.load_raw().await?;
        if raw.remove(key).is_none() {
            debug!(path = %self.file_path.display(), key, "delete of absent key; table untouched");
            return Ok(false);
        }
        json_file::save(&self.file_path, &raw).await?;
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<(String, V)>, StoreError> {
        Ok(self.load_table().await?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TempDataDir;

    #[tokio::test]
    async fn json_table_crud_persists() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("json_table");
        let path = dir.file("table.json");
        let table = JsonTable::<String>::new(&path)?;

        // initially empty, file not created yet
        assert!(table.list().await?.is_empty());
        assert!(tokio::fs::metadata(&path).await.is_err());

        table.put("a", "1".into()).await?;
        table.put("b", "2".into()).await?;
        assert_eq!(table.get("a").await?.as_deref(), Some("1"));

        // overwrite in place
        table.put("a", "10".into()).await?;

        assert!(table.delete("b").await?);

        // reopen from disk
        let reloaded = JsonTable::<String>::new(&path)?;
        assert_eq!(reloaded.list().await?, vec![("a".to_string(), "10".to_string())]);
        Ok(())
    }

    #[tokio::test]
    async fn deleting_absent_key_leaves_file_alone() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("json_table_absent");
        let path = dir.file("table.json");
        let table = JsonTable::<u32>::new(&path)?;
        table.put("x", 1).await?;
        let before = tokio::fs::metadata(&path).await?.modified()?;
        let before_text = tokio::fs::read_to_string(&path).await?;

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!table.delete("missing").await?);

        assert_eq!(tokio::fs::metadata(&path).await?.modified()?, before);
        assert_eq!(tokio::fs::read_to_string(&path).await?, before_text);
        Ok(())
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Entry {
        n: u32,
    }

    #[tokio::test]
    async fn undecodable_record_survives_other_writes() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("json_table_undecodable");
        let path = dir.file("table.json");
        json_file::save(&path, &serde_json::json!({
            "bad": {"n": "seven"},
            "good": {"n": 1}
        }))
        .await?;

        let table = JsonTable::<Entry>::new(&path)?;
        assert!(matches!(table.get("bad").await, Err(StoreError::Schema { .. })));
        assert_eq!(table.get("good").await?, Some(Entry { n: 1 }));
        assert_eq!(table.list().await?, vec![("good".to_string(), Entry { n: 1 })]);

        table.put("new", Entry { n: 2 }).await?;
        assert!(table.delete("good").await?);

        let raw: Value = json_file::load(&path, Value::Null).await?;
        assert_eq!(raw, serde_json::json!({"bad": {"n": "seven"}, "new": {"n": 2}}));
        Ok(())
    }

    #[test]
    fn rejects_non_json_path() {
        assert!(matches!(JsonTable::<u32>::new("users.db"), Err(StoreError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn concurrent_puts_in_one_process_are_not_lost() -> Result<(), anyhow::Error> {
        let dir = TempDataDir::new("json_table_concurrent");
        let table = std::sync::Arc::new(JsonTable::<u32>::new(dir.file("table.json"))?);

        let mut handles = Vec::new();
        for i in 0..8u32 {
            let table = table.clone();
            handles.push(tokio::spawn(async move { table.put(&format!("k{i}"), i).await }));
        }
        for h in handles {
            h.await??;
        }
        assert_eq!(table.list().await?.len(), 8);
        Ok(())
    }
}
