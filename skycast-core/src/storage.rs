//! Best-effort key/value persistence for the remembered city.

use async_trait::async_trait;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::{error::WeatherError, model::CITY_KEY};

/// Asynchronous string store.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, WeatherError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), WeatherError>;
}

/// JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `store.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, WeatherError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                WeatherError::storage(format!("Corrupt store {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(WeatherError::storage(format!(
                "Failed to read store {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, WeatherError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), WeatherError> {
        // A corrupt file is replaced rather than blocking every future write.
        let mut entries = self.read_all().await.unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                WeatherError::storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let body = serde_json::to_string_pretty(&entries)
            .map_err(|e| WeatherError::storage(e.to_string()))?;

        tokio::fs::write(&self.path, body).await.map_err(|e| {
            WeatherError::storage(format!("Failed to write store {}: {e}", self.path.display()))
        })
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, WeatherError> {
        let entries = self.entries.lock().map_err(|e| WeatherError::storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), WeatherError> {
        let mut entries = self.entries.lock().map_err(|e| WeatherError::storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Wraps a store so that callers never observe failures.
#[derive(Debug, Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persistence backed by [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Write `value`; errors are logged and dropped.
    pub async fn store(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            tracing::warn!(key, error = %e, "Error storing value");
        }
    }

    /// Read `key`; a missing key and a failed read both yield `None`.
    pub async fn retrieve(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Error retrieving value");
                None
            }
        }
    }

    pub async fn remember_city(&self, city: &str) {
        self.store(CITY_KEY, city).await
    }

    pub async fn last_city(&self) -> Option<String> {
        self.retrieve(CITY_KEY).await.filter(|city| !city.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, WeatherError> {
            Err(WeatherError::storage("disk on fire"))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), WeatherError> {
            Err(WeatherError::storage("disk on fire"))
        }
    }

    #[tokio::test]
    async fn retrieve_returns_what_was_stored() {
        let memory = Persistence::in_memory();
        memory.store("city", "London").await;
        assert_eq!(memory.retrieve("city").await.as_deref(), Some("London"));
    }

    #[tokio::test]
    async fn storing_twice_is_idempotent() {
        let memory = Persistence::in_memory();
        memory.store("city", "Paris").await;
        memory.store("city", "Paris").await;
        assert_eq!(memory.retrieve("city").await.as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let memory = Persistence::in_memory();
        assert_eq!(memory.retrieve("city").await, None);
    }

    #[tokio::test]
    async fn failures_are_swallowed() {
        let memory = Persistence::new(Arc::new(BrokenStore));
        memory.store("city", "London").await;
        assert_eq!(memory.retrieve("city").await, None);
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("nested");

        let memory = Persistence::new(Arc::new(FileStore::in_dir(&nested)));
        memory.remember_city("Nairobi").await;
        memory.store("unit", "metric").await;

        let reopened = Persistence::new(Arc::new(FileStore::in_dir(&nested)));
        assert_eq!(reopened.last_city().await.as_deref(), Some("Nairobi"));
        assert_eq!(reopened.retrieve("unit").await.as_deref(), Some("metric"));
    }

    #[tokio::test]
    async fn file_store_overwrites_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::in_dir(dir.path());

        store.set("city", "Oslo").await.expect("first write");
        store.set("city", "Bergen").await.expect("second write");

        assert_eq!(store.get("city").await.expect("read").as_deref(), Some("Bergen"));
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_error_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::in_dir(dir.path());
        std::fs::write(store.path(), "{ not json").expect("seed corrupt file");

        assert!(matches!(store.get("city").await, Err(WeatherError::Storage(_))));

        store.set("city", "Lima").await.expect("write over corrupt file");
        assert_eq!(store.get("city").await.expect("read").as_deref(), Some("Lima"));
    }
}
