//! Executes machine commands against the store and collaborators
//!
//! No step failure is fatal. Store, principal and login errors are logged and
//! turned into the event that leads the machine to a halt; the next cold start
//! begins again at `SessionCheck`.

use super::machine::{CacheFinding, Command, HaltReason, SyncEvent, SyncMachine, SyncPhase};
use crate::auth::{LoginFlow, LogoutFlow, Principal};
use crate::models::UnifiedOtpService;
use crate::services::merger::{decode_records, merge_with_report};
use crate::services::{LegacyKind, LegacyReader, SessionGuard};
use crate::store::{set_json, KeyValueStore, StoreError, StoreKeys, StoreResult};
use crate::ui::SyncView;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Everything the startup sequence talks to
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn KeyValueStore>,
    pub principal: Arc<dyn Principal>,
    pub login: Arc<dyn LoginFlow>,
    pub logout: Arc<dyn LogoutFlow>,
}

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub keys: StoreKeys,
    /// Remove legacy keys once the unified payload is stored
    pub clear_legacy_after_migration: bool,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Ready(Vec<UnifiedOtpService>),
    LoggedOut,
    Loading { reason: Option<HaltReason> },
}

pub struct SyncDriver {
    collaborators: Collaborators,
    options: SyncOptions,
    machine: SyncMachine,
    services: Vec<UnifiedOtpService>,
    view: watch::Sender<SyncView>,
}

impl SyncDriver {
    pub fn new(collaborators: Collaborators, options: SyncOptions) -> Self {
        let (view, _) = watch::channel(SyncView::default());
        Self {
            collaborators,
            options,
            machine: SyncMachine::new(),
            services: Vec::new(),
            view,
        }
    }

    /// Observe the `(phase, services)` pair
    pub fn subscribe(&self) -> watch::Receiver<SyncView> {
        self.view.subscribe()
    }

    pub fn phase(&self) -> SyncPhase {
        self.machine.phase()
    }

    /// Run the startup sequence to completion or halt
    pub async fn run(&mut self) -> SyncOutcome {
        let mut queue: VecDeque<Command> = self.machine.start().into();

        while let Some(command) = queue.pop_front() {
            debug!(?command, "executing");
            let Some(event) = self.execute(command).await else {
                continue;
            };

            queue.extend(self.machine.advance(event));
            // Ready is published by LoadServices once the list is in hand
            if !self.machine.is_ready() {
                self.publish_loading();
            }
        }

        self.outcome()
    }

    fn outcome(&self) -> SyncOutcome {
        match self.machine.halt_reason() {
            Some(HaltReason::ForcedLogout) => SyncOutcome::LoggedOut,
            Some(reason) => SyncOutcome::Loading {
                reason: Some(reason),
            },
            None if self.machine.is_ready() => SyncOutcome::Ready(self.services.clone()),
            None => SyncOutcome::Loading { reason: None },
        }
    }

    async fn execute(&mut self, command: Command) -> Option<SyncEvent> {
        match command {
            Command::CheckSession => {
                let status = self.session_guard().check_session().await;
                Some(SyncEvent::SessionChecked {
                    changed: status.changed,
                })
            }
            Command::ForceLogout => {
                if let Err(e) = self.collaborators.logout.logout().await {
                    warn!(error = %e, "logout failed");
                }
                None
            }
            Command::CheckCache => Some(SyncEvent::CacheChecked {
                found: self.check_cache().await,
            }),
            Command::MigrateLegacy => Some(SyncEvent::MigrationCompleted {
                ok: self.migrate_legacy().await,
            }),
            Command::Login => {
                let ok = match self.collaborators.login.login().await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(error = %e, "login failed");
                        false
                    }
                };
                Some(SyncEvent::LoginCompleted { ok })
            }
            Command::RecordIdentity => {
                if let Err(e) = self.session_guard().record_identity().await {
                    warn!(error = %e, "failed to record session identity");
                }
                None
            }
            Command::LoadServices => {
                self.services = self.load_services().await;
                self.view
                    .send_replace(SyncView::ready(self.services.clone()));
                info!(services = self.services.len(), "ready");
                None
            }
        }
    }

    fn session_guard(&self) -> SessionGuard<'_> {
        SessionGuard::new(
            self.collaborators.store.as_ref(),
            &self.options.keys,
            self.collaborators.principal.as_ref(),
        )
    }

    fn legacy_reader(&self) -> LegacyReader<'_> {
        LegacyReader::new(self.collaborators.store.as_ref(), &self.options.keys)
    }

    async fn check_cache(&self) -> CacheFinding {
        match self.cache_presence().await {
            Ok(found) => {
                debug!(?found, "cache checked");
                found
            }
            Err(e) => {
                warn!(error = %e, "failed to inspect cache");
                CacheFinding::Unavailable
            }
        }
    }

    async fn cache_presence(&self) -> StoreResult<CacheFinding> {
        let store = self.collaborators.store.as_ref();
        if store.has(&self.options.keys.unified).await? {
            return Ok(CacheFinding::Unified);
        }

        let reader = self.legacy_reader();
        let services = reader.has_legacy(LegacyKind::Services).await?;
        let apps = reader.has_legacy(LegacyKind::Apps).await?;
        Ok(CacheFinding::from_presence(false, services, apps))
    }

    async fn migrate_legacy(&self) -> bool {
        let reader = self.legacy_reader();

        let services = match lenient(reader.read_services().await, LegacyKind::Services) {
            Ok(payload) => payload.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to read legacy services");
                return false;
            }
        };
        let apps = match lenient(reader.read_apps().await, LegacyKind::Apps) {
            Ok(payload) => payload.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to read legacy apps");
                return false;
            }
        };

        let report = merge_with_report(&services, &apps);
        info!(
            services = report.services.len(),
            skipped_tokens = report.skipped_tokens,
            skipped_apps = report.skipped_apps,
            duplicates = report.duplicate_tokens,
            unresolved_apps = report.unresolved_apps,
            "legacy cache merged"
        );

        let store = self.collaborators.store.as_ref();
        if let Err(e) = set_json(store, &self.options.keys.unified, &report.services).await {
            warn!(error = %e, "failed to persist unified services");
            return false;
        }

        if self.options.clear_legacy_after_migration {
            for kind in [LegacyKind::Services, LegacyKind::Apps] {
                if let Err(e) = store.remove(kind.key(&self.options.keys)).await {
                    warn!(?kind, error = %e, "failed to remove migrated legacy payload");
                }
            }
        }

        true
    }

    async fn load_services(&self) -> Vec<UnifiedOtpService> {
        let store = self.collaborators.store.as_ref();
        match store.get(&self.options.keys.unified).await {
            Ok(Some(serde_json::Value::Array(records))) => {
                decode_records::<UnifiedOtpService>(&records, "service").0
            }
            Ok(Some(_)) => {
                warn!("unified payload is not a list, showing no services");
                Vec::new()
            }
            Ok(None) => {
                warn!("unified payload missing after population");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to load unified services");
                Vec::new()
            }
        }
    }

    fn publish_loading(&self) {
        self.view.send_replace(SyncView::loading(
            self.machine.phase(),
            self.machine.halt_reason(),
        ));
    }
}

/// A legacy payload with the wrong overall shape is migrated as empty
fn lenient<T>(result: StoreResult<Option<T>>, kind: LegacyKind) -> StoreResult<Option<T>> {
    match result {
        Err(StoreError::Decode { key, source }) => {
            warn!(?kind, %key, error = %source, "legacy payload unreadable, treating as empty");
            Ok(None)
        }
        other => other,
    }
}
