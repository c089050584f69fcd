//! Local collaborators used by the command-line binary

use super::{LoginFlow, LogoutFlow, Principal};
use crate::services::merger::merge_with_report;
use crate::models::{CachedAppsPayload, CachedServicesPayload};
use crate::store::{set_json, KeyValueStore, StoreKeys};
use crate::Result;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Principal whose identity comes from configuration
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPrincipal {
    identity: Option<String>,
}

impl ConfiguredPrincipal {
    pub fn new(identity: Option<String>) -> Self {
        let identity = identity
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self { identity }
    }
}

#[async_trait]
impl Principal for ConfiguredPrincipal {
    async fn current_identity(&self) -> Result<Option<String>> {
        Ok(self.identity.clone())
    }
}

/// Export document in the remote API's shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteExport {
    #[serde(default)]
    pub authenticator_tokens: Vec<serde_json::Value>,
    #[serde(default)]
    pub apps: Vec<serde_json::Value>,
}

/// Login flow that populates the unified payload from an export file
pub struct ImportLoginFlow {
    store: Arc<dyn KeyValueStore>,
    keys: StoreKeys,
    import_path: Option<PathBuf>,
}

impl ImportLoginFlow {
    pub fn new(store: Arc<dyn KeyValueStore>, keys: StoreKeys, import_path: Option<PathBuf>) -> Self {
        Self {
            store,
            keys,
            import_path,
        }
    }
}

#[async_trait]
impl LoginFlow for ImportLoginFlow {
    async fn login(&self) -> Result<()> {
        let Some(path) = &self.import_path else {
            anyhow::bail!("No import_path configured; cannot fetch OTP data");
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let export: RemoteExport = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let services = CachedServicesPayload {
            authenticator_tokens: export.authenticator_tokens,
        };
        let apps = CachedAppsPayload { apps: export.apps };
        let report = merge_with_report(&services, &apps);

        set_json(self.store.as_ref(), &self.keys.unified, &report.services)
            .await
            .context("Failed to store fetched OTP services")?;

        info!(
            path = %path.display(),
            services = report.services.len(),
            skipped = report.skipped_tokens,
            "imported OTP services"
        );
        Ok(())
    }
}

/// Logout flow that drops every cached key
pub struct StoreLogout {
    store: Arc<dyn KeyValueStore>,
}

impl StoreLogout {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LogoutFlow for StoreLogout {
    async fn logout(&self) -> Result<()> {
        self.store.clear().await.context("Failed to clear store")?;
        info!("signed out, cached OTP data removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnifiedOtpService;
    use crate::store::{get_json, MemoryStore};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_configured_principal_blank_is_none() {
        let principal = ConfiguredPrincipal::new(Some("   ".to_string()));
        assert_eq!(principal.current_identity().await.unwrap(), None);

        let principal = ConfiguredPrincipal::new(Some(" me@example.com ".to_string()));
        assert_eq!(
            principal.current_identity().await.unwrap().as_deref(),
            Some("me@example.com")
        );
    }

    #[tokio::test]
    async fn test_import_login_writes_unified_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("export.json");
        std::fs::write(
            &path,
            json!({
                "authenticator_tokens": [{"id": "A", "secret": "X", "appId": 1}],
                "apps": [{"id": 1, "name": "Bank"}]
            })
            .to_string(),
        )
        .unwrap();

        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let keys = StoreKeys::default();
        let flow = ImportLoginFlow::new(store.clone(), keys.clone(), Some(path));

        flow.login().await.unwrap();

        let services: Vec<UnifiedOtpService> =
            get_json(store.as_ref(), &keys.unified).await.unwrap().unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].app.as_ref().unwrap().name, "Bank");
        assert!(!store.has(&keys.services).await.unwrap());
    }

    #[tokio::test]
    async fn test_import_login_without_path_fails() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let flow = ImportLoginFlow::new(store.clone(), StoreKeys::default(), None);

        assert!(flow.login().await.is_err());
        assert!(!store.has("otp-services").await.unwrap());
    }

    #[tokio::test]
    async fn test_import_login_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let flow = ImportLoginFlow::new(
            store,
            StoreKeys::default(),
            Some(temp_dir.path().join("missing.json")),
        );

        let err = flow.login().await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[tokio::test]
    async fn test_store_logout_clears_everything() {
        let memory = Arc::new(MemoryStore::with_entries([
            ("user", json!({"email": "a@b.c"})),
            ("otp-services", json!([])),
        ]));
        let logout = StoreLogout::new(memory.clone());

        logout.logout().await.unwrap();

        assert!(memory.keys().await.is_empty());
    }
}
