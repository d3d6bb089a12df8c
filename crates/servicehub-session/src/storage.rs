//! Durable storage backends.
//!
//! The identity store only ever touches one key, but backends are plain
//! string key-value stores so the same file can carry other records later.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::error::{StorageError, StorageResult};

/// Key under which the signed-in token is persisted.
pub const USER_ID_KEY: &str = "userId";

/// Trait for durable key-value backends.
///
/// Implementations must treat removing an absent key as success.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes a value.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

#[async_trait]
impl<T: DurableStore + ?Sized> DurableStore for Arc<T> {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key).await
    }
}

/// In-memory backend. Contents live as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records.
    pub fn with_records<I, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let records = records
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Snapshot of every record.
    pub fn records(&self) -> HashMap<String, String> {
        self.records.read().clone()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.records.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.records
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.records.write().remove(key);
        Ok(())
    }
}

/// Backend that keeps all records in a single JSON object file.
///
/// A missing file reads as empty. Writes go to a sibling temp file that is
/// then renamed over the original, so a crash never leaves half a record.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by the file at `path`.
    ///
    /// Nothing is touched on disk until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = ?self.path, "Session file not found");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Like `load`, but a corrupt file is discarded so writes can recover.
    async fn load_or_reset(&self) -> StorageResult<BTreeMap<String, String>> {
        match self.load().await {
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(path = ?self.path, error = %e, "Discarding corrupt session file");
                tokio::fs::remove_file(&self.path).await?;
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    async fn persist(&self, records: &BTreeMap<String, String>) -> StorageResult<()> {
        if records.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string(records)?;
        replace_file(&self.path, contents.as_bytes()).await?;

        tracing::debug!(path = ?self.path, records = records.len(), "Saved session file");
        Ok(())
    }
}

/// Write `contents` to a sibling temp file and rename it over `path`.
///
/// The temp file is removed if either step fails.
async fn replace_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let result = match tokio::fs::write(&tmp, contents).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        match tokio::fs::remove_file(&tmp).await {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                tracing::warn!(path = ?tmp, error = %e, "Failed to remove temp file");
            }
            _ => {}
        }
    }
    result
}

#[async_trait]
impl DurableStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_or_reset().await?;
        records.insert(key.to_string(), value.to_string());
        self.persist(&records).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        let mut records = self.load_or_reset().await?;
        if records.remove(key).is_some() || records.is_empty() {
            self.persist(&records).await
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get(USER_ID_KEY).await.unwrap(), None);

        store.set(USER_ID_KEY, "abc").await.unwrap();
        assert_eq!(store.get(USER_ID_KEY).await.unwrap().as_deref(), Some("abc"));

        store.remove(USER_ID_KEY).await.unwrap();
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_remove_missing_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove(USER_ID_KEY).await.is_ok());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        assert_eq!(store.get(USER_ID_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_writes_json_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let store = FileStore::new(&path);

        store.set(USER_ID_KEY, "abc123").await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, r#"{"userId":"abc123"}"#);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        FileStore::new(&path).set(USER_ID_KEY, "xyz").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(USER_ID_KEY).await.unwrap().as_deref(), Some("xyz"));
    }

    #[tokio::test]
    async fn test_file_store_remove_last_record_deletes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::new(&path);

        store.set(USER_ID_KEY, "abc").await.unwrap();
        store.remove(USER_ID_KEY).await.unwrap();

        assert!(!path.exists());
        // Second removal is a no-op.
        store.remove(USER_ID_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_keeps_other_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::new(&path);

        store.set("theme", "dark").await.unwrap();
        store.set(USER_ID_KEY, "abc").await.unwrap();
        store.remove(USER_ID_KEY).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, r#"{"theme":"dark"}"#);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(USER_ID_KEY).await,
            Err(StorageError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_file_store_write_replaces_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        store.set(USER_ID_KEY, "fresh").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"userId":"fresh"}"#);
    }

    #[tokio::test]
    async fn test_file_store_remove_clears_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        FileStore::new(&path).remove(USER_ID_KEY).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_replace_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "").unwrap();

        assert!(replace_file(&path, br#"{"userId":"abc"}"#).await.is_err());
        assert!(!dir.path().join("session.json.tmp").exists());
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_arc_store_delegates() {
        let inner = Arc::new(MemoryStore::new());
        let shared: Arc<dyn DurableStore> = inner.clone();

        shared.set(USER_ID_KEY, "via-arc").await.unwrap();
        assert_eq!(inner.records().get(USER_ID_KEY).map(String::as_str), Some("via-arc"));
    }
}
