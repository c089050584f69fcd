//! Single-file JSON store
//!
//! The whole store is one JSON object on disk. Every mutation rewrites the file
//! through a temp file in the same directory followed by an atomic rename, so a
//! crash leaves either the previous or the new contents, never a mix.

use super::{KeyValueStore, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StoreResult<Map<String, Value>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::NotAnObject(self.path.display().to_string())),
        }
    }

    /// Atomic replace of the whole file, run on the blocking pool
    async fn save(&self, entries: Map<String, Value>) -> StoreResult<()> {
        let path = self.path.clone();
        let keys = entries.len();

        tokio::task::spawn_blocking(move || write_atomic(&path, &entries))
            .await
            .map_err(|e| StoreError::Persist(e.to_string()))??;

        debug!(path = %self.path.display(), keys, "store file written");
        Ok(())
    }
}

fn write_atomic(path: &Path, entries: &Map<String, Value>) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(entries)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut temp_file = NamedTempFile::new_in(&parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.flush()?;
    temp_file
        .persist(path)
        .map_err(|e| StoreError::Persist(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value);
        self.save(entries).await
    }

    async fn has(&self, key: &str) -> StoreResult<bool> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.contains_key(key))
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        self.save(Map::new()).await
    }
}
