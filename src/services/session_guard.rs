//! Session guard - invalidates cached data when the account changes
//!
//! Policy for the recorded/live identity pair:
//!
//! | recorded | live      | outcome                          |
//! |----------|-----------|----------------------------------|
//! | none     | none      | unchanged                        |
//! | none     | some      | unchanged, live identity adopted |
//! | some     | same      | unchanged                        |
//! | some     | different | changed                          |
//! | some     | none      | changed                          |
//!
//! Failing to read either side counts as changed. A changed session clears
//! every key in the store.

use crate::auth::Principal;
use crate::models::SessionRecord;
use crate::store::{get_json, set_json, KeyValueStore, StoreKeys};
use crate::Result;
use anyhow::Context;
use tracing::{debug, info, warn};

/// Outcome of a session check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub changed: bool,
}

impl SessionStatus {
    pub fn unchanged() -> Self {
        Self { changed: false }
    }

    pub fn changed() -> Self {
        Self { changed: true }
    }
}

pub struct SessionGuard<'a> {
    store: &'a dyn KeyValueStore,
    keys: &'a StoreKeys,
    principal: &'a dyn Principal,
}

impl<'a> SessionGuard<'a> {
    pub fn new(store: &'a dyn KeyValueStore, keys: &'a StoreKeys, principal: &'a dyn Principal) -> Self {
        Self {
            store,
            keys,
            principal,
        }
    }

    /// Compare recorded and live identity, clearing the store on mismatch
    pub async fn check_session(&self) -> SessionStatus {
        let live = match self.principal.current_identity().await {
            Ok(live) => live,
            Err(e) => {
                warn!(error = %e, "failed to read authenticated principal");
                return self.invalidate().await;
            }
        };

        let recorded = match get_json::<SessionRecord>(self.store, &self.keys.session).await {
            Ok(recorded) => recorded,
            Err(e) => {
                warn!(error = %e, "failed to read recorded session identity");
                return self.invalidate().await;
            }
        };

        match (recorded, live) {
            (None, None) => {
                debug!("no recorded identity and no principal");
                SessionStatus::unchanged()
            }
            (None, Some(email)) => {
                info!(%email, "first sign-in, adopting identity");
                if let Err(e) = self.write_record(&email).await {
                    warn!(error = %e, "failed to record session identity");
                }
                SessionStatus::unchanged()
            }
            (Some(record), Some(email)) if record.matches(&email) => {
                debug!(%email, "session identity unchanged");
                SessionStatus::unchanged()
            }
            (Some(record), live) => {
                info!(recorded = %record.email, live = ?live, "session identity changed");
                self.invalidate().await
            }
        }
    }

    /// Record the live identity as the owner of the cached data
    ///
    /// Does nothing when no principal is signed in.
    pub async fn record_identity(&self) -> Result<()> {
        match self.principal.current_identity().await? {
            Some(email) => self.write_record(&email).await,
            None => {
                debug!("no principal to record");
                Ok(())
            }
        }
    }

    async fn write_record(&self, email: &str) -> Result<()> {
        set_json(self.store, &self.keys.session, &SessionRecord::new(email))
            .await
            .context("Failed to write session identity")
    }

    async fn invalidate(&self) -> SessionStatus {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear cached data after session change");
        }
        SessionStatus::changed()
    }
}
