//! Command implementations for the `otpsync` binary

pub mod logout;
pub mod status;
pub mod sync;

use crate::auth::{ConfiguredPrincipal, ImportLoginFlow, StoreLogout};
use crate::config::SyncConfig;
use crate::state::Collaborators;
use crate::store::{JsonFileStore, KeyValueStore};
use crate::Result;
use std::sync::Arc;

/// Open the configured file store
pub fn open_store(config: &SyncConfig) -> Result<Arc<dyn KeyValueStore>> {
    let path = config.resolved_store_path()?;
    Ok(Arc::new(JsonFileStore::new(path)))
}

/// Wire the local collaborators around `store`
pub fn local_collaborators(config: &SyncConfig, store: Arc<dyn KeyValueStore>) -> Collaborators {
    Collaborators {
        principal: Arc::new(ConfiguredPrincipal::new(config.resolved_account())),
        login: Arc::new(ImportLoginFlow::new(
            store.clone(),
            config.keys.clone(),
            config.import_path.clone(),
        )),
        logout: Arc::new(StoreLogout::new(store.clone())),
        store,
    }
}
