//! Key-Value Store capability
//!
//! The startup sequence never touches persistence directly; it is handed a
//! [`KeyValueStore`] and a [`StoreKeys`] set. Values are JSON and every write
//! replaces the whole value under a key.

mod file;
mod keys;
mod memory;

pub use file::JsonFileStore;
pub use keys::StoreKeys;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by store implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store file must contain a JSON object: {0}")]
    NotAnObject(String),

    #[error("Value under '{key}' has an unexpected shape: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to persist store file: {0}")]
    Persist(String),
}

/// Persistence primitive: whole-value get/set by string key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`; `Ok(None)` when the key is absent
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Replace the value under `key`
    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;

    async fn has(&self, key: &str) -> StoreResult<bool>;

    /// Drop a single key; absent keys are not an error
    async fn remove(&self, key: &str) -> StoreResult<()>;

    /// Drop every key
    async fn clear(&self) -> StoreResult<()>;
}

/// Read and decode the value under `key`
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encode `value` and store it under `key`
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let value = serde_json::to_value(value)?;
    store.set(key, value).await
}
