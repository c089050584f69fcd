//! Legacy data reader - lookups of the two pre-migration payloads

use crate::models::{CachedAppsPayload, CachedServicesPayload};
use crate::store::{get_json, KeyValueStore, StoreKeys, StoreResult};

/// Which legacy payload to look at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyKind {
    Services,
    Apps,
}

impl LegacyKind {
    pub fn key<'a>(&self, keys: &'a StoreKeys) -> &'a str {
        match self {
            LegacyKind::Services => &keys.services,
            LegacyKind::Apps => &keys.apps,
        }
    }
}

/// A decoded legacy payload
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyPayload {
    Services(CachedServicesPayload),
    Apps(CachedAppsPayload),
}

/// Read-only view over the legacy keys
///
/// Absence is `Ok(None)`, distinct from a present-but-empty payload.
pub struct LegacyReader<'a> {
    store: &'a dyn KeyValueStore,
    keys: &'a StoreKeys,
}

impl<'a> LegacyReader<'a> {
    pub fn new(store: &'a dyn KeyValueStore, keys: &'a StoreKeys) -> Self {
        Self { store, keys }
    }

    pub async fn has_legacy(&self, kind: LegacyKind) -> StoreResult<bool> {
        self.store.has(kind.key(self.keys)).await
    }

    pub async fn read_legacy(&self, kind: LegacyKind) -> StoreResult<Option<LegacyPayload>> {
        Ok(match kind {
            LegacyKind::Services => self.read_services().await?.map(LegacyPayload::Services),
            LegacyKind::Apps => self.read_apps().await?.map(LegacyPayload::Apps),
        })
    }

    pub async fn read_services(&self) -> StoreResult<Option<CachedServicesPayload>> {
        get_json(self.store, &self.keys.services).await
    }

    pub async fn read_apps(&self) -> StoreResult<Option<CachedAppsPayload>> {
        get_json(self.store, &self.keys.apps).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use serde_json::json;

    #[tokio::test]
    async fn test_absent_payloads() {
        let store = MemoryStore::new();
        let keys = StoreKeys::default();
        let reader = LegacyReader::new(&store, &keys);

        assert!(!reader.has_legacy(LegacyKind::Services).await.unwrap());
        assert!(!reader.has_legacy(LegacyKind::Apps).await.unwrap());
        assert_eq!(reader.read_legacy(LegacyKind::Services).await.unwrap(), None);
        assert_eq!(reader.read_legacy(LegacyKind::Apps).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_present_but_empty_payload() {
        let store = MemoryStore::with_entries([("apps", json!({"apps": []}))]);
        let keys = StoreKeys::default();
        let reader = LegacyReader::new(&store, &keys);

        assert!(reader.has_legacy(LegacyKind::Apps).await.unwrap());
        assert!(!reader.has_legacy(LegacyKind::Services).await.unwrap());

        match reader.read_legacy(LegacyKind::Apps).await.unwrap() {
            Some(LegacyPayload::Apps(payload)) => assert!(payload.is_empty()),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_services_keeps_raw_records() {
        let store = MemoryStore::with_entries([(
            "services",
            json!({"authenticator_tokens": [{"id": "A", "secret": "X"}, {"broken": true}]}),
        )]);
        let keys = StoreKeys::default();
        let reader = LegacyReader::new(&store, &keys);

        let payload = reader.read_services().await.unwrap().unwrap();
        assert_eq!(payload.len(), 2);
    }

    #[tokio::test]
    async fn test_read_does_not_mutate_store() {
        let store = MemoryStore::with_entries([("services", json!({"authenticator_tokens": []}))]);
        let keys = StoreKeys::default();
        let reader = LegacyReader::new(&store, &keys);

        reader.read_services().await.unwrap();
        reader.read_apps().await.unwrap();

        assert_eq!(store.keys().await, vec!["services".to_string()]);
    }

    #[tokio::test]
    async fn test_wrong_shape_payload_is_decode_error() {
        let store = MemoryStore::with_entries([("services", json!("not an object"))]);
        let keys = StoreKeys::default();
        let reader = LegacyReader::new(&store, &keys);

        assert!(matches!(
            reader.read_services().await,
            Err(StoreError::Decode { .. })
        ));
    }
}
