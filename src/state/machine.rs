//! Startup state machine
//!
//! ```text
//! SessionCheck --(unchanged)--> CacheCheck --(unified present)--> Ready
//! SessionCheck --(changed)----> halt: forced logout
//! CacheCheck   --(legacy)-----> migrate --(ok)--> Ready
//! CacheCheck   --(nothing)----> login   --(ok)--> Ready
//! ```
//!
//! The machine performs no I/O. `advance` consumes an event and returns the
//! commands the driver must execute next. An event that does not answer the
//! command currently awaited is ignored, as is every event once halted.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Process-wide startup phase; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPhase {
    SessionCheck,
    CacheCheck,
    Ready,
}

/// What the cache check found, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFinding {
    /// Unified payload present
    Unified,
    /// No unified payload, at least one legacy payload
    Legacy,
    /// Nothing usable cached
    Empty,
    /// The store could not be read
    Unavailable,
}

impl CacheFinding {
    pub fn from_presence(unified: bool, legacy_services: bool, legacy_apps: bool) -> Self {
        if unified {
            CacheFinding::Unified
        } else if legacy_services || legacy_apps {
            CacheFinding::Legacy
        } else {
            CacheFinding::Empty
        }
    }
}

/// Completion of an asynchronous step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    SessionChecked { changed: bool },
    CacheChecked { found: CacheFinding },
    MigrationCompleted { ok: bool },
    LoginCompleted { ok: bool },
}

/// Side effects requested by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CheckSession,
    ForceLogout,
    CheckCache,
    MigrateLegacy,
    Login,
    RecordIdentity,
    LoadServices,
}

/// Why a run stopped before `Ready`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HaltReason {
    ForcedLogout,
    CacheUnavailable,
    MigrationFailed,
    LoginFailed,
}

impl HaltReason {
    pub fn describe(&self) -> &'static str {
        match self {
            HaltReason::ForcedLogout => "account changed, signed out",
            HaltReason::CacheUnavailable => "local cache could not be read",
            HaltReason::MigrationFailed => "cached data could not be migrated",
            HaltReason::LoginFailed => "could not fetch OTP data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Idle,
    AwaitSession,
    AwaitCache,
    AwaitMigration,
    AwaitLogin,
    Done,
}

#[derive(Debug, Clone)]
pub struct SyncMachine {
    step: Step,
    halt: Option<HaltReason>,
}

impl Default for SyncMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncMachine {
    pub fn new() -> Self {
        Self {
            step: Step::Idle,
            halt: None,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        match self.step {
            Step::Idle | Step::AwaitSession => SyncPhase::SessionCheck,
            Step::AwaitCache | Step::AwaitMigration | Step::AwaitLogin => SyncPhase::CacheCheck,
            Step::Done => SyncPhase::Ready,
        }
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halt
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.step == Step::Done
    }

    /// Begin the run; only the first call issues a command
    pub fn start(&mut self) -> Vec<Command> {
        if self.step != Step::Idle {
            debug!(phase = ?self.phase(), "start ignored, run already in progress");
            return Vec::new();
        }
        self.step = Step::AwaitSession;
        debug!("startup sequence begins");
        vec![Command::CheckSession]
    }

    pub fn advance(&mut self, event: SyncEvent) -> Vec<Command> {
        if let Some(reason) = self.halt {
            debug!(?event, ?reason, "machine halted, event ignored");
            return Vec::new();
        }

        let before = self.phase();
        let commands = match (self.step, event) {
            (Step::AwaitSession, SyncEvent::SessionChecked { changed: true }) => {
                self.stop(HaltReason::ForcedLogout);
                vec![Command::ForceLogout]
            }
            (Step::AwaitSession, SyncEvent::SessionChecked { changed: false }) => {
                self.step = Step::AwaitCache;
                vec![Command::CheckCache]
            }
            (Step::AwaitCache, SyncEvent::CacheChecked { found }) => match found {
                CacheFinding::Unified => {
                    self.step = Step::Done;
                    vec![Command::LoadServices]
                }
                CacheFinding::Legacy => {
                    self.step = Step::AwaitMigration;
                    vec![Command::MigrateLegacy]
                }
                CacheFinding::Empty => {
                    self.step = Step::AwaitLogin;
                    vec![Command::Login]
                }
                CacheFinding::Unavailable => {
                    self.stop(HaltReason::CacheUnavailable);
                    Vec::new()
                }
            },
            (Step::AwaitMigration, SyncEvent::MigrationCompleted { ok }) => {
                self.populated(ok, HaltReason::MigrationFailed)
            }
            (Step::AwaitLogin, SyncEvent::LoginCompleted { ok }) => {
                self.populated(ok, HaltReason::LoginFailed)
            }
            (step, event) => {
                debug!(?step, ?event, "event does not match awaited step, ignored");
                Vec::new()
            }
        };

        let after = self.phase();
        if before != after {
            info!(from = ?before, to = ?after, "phase transition");
        }
        commands
    }

    fn populated(&mut self, ok: bool, failure: HaltReason) -> Vec<Command> {
        if ok {
            self.step = Step::Done;
            vec![Command::RecordIdentity, Command::LoadServices]
        } else {
            self.stop(failure);
            Vec::new()
        }
    }

    fn stop(&mut self, reason: HaltReason) {
        warn!(phase = ?self.phase(), ?reason, "startup sequence halted");
        self.halt = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> SyncMachine {
        let mut machine = SyncMachine::new();
        assert_eq!(machine.start(), vec![Command::CheckSession]);
        machine
    }

    fn in_cache_check() -> SyncMachine {
        let mut machine = started();
        assert_eq!(
            machine.advance(SyncEvent::SessionChecked { changed: false }),
            vec![Command::CheckCache]
        );
        machine
    }

    #[test]
    fn test_new_machine_is_in_session_check() {
        let machine = SyncMachine::new();
        assert_eq!(machine.phase(), SyncPhase::SessionCheck);
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_start_is_issued_once() {
        let mut machine = started();
        assert!(machine.start().is_empty());
    }

    #[test]
    fn test_session_changed_forces_logout_and_halts() {
        let mut machine = started();

        let commands = machine.advance(SyncEvent::SessionChecked { changed: true });

        assert_eq!(commands, vec![Command::ForceLogout]);
        assert_eq!(machine.phase(), SyncPhase::SessionCheck);
        assert_eq!(machine.halt_reason(), Some(HaltReason::ForcedLogout));

        // nothing advances a halted machine
        assert!(machine
            .advance(SyncEvent::SessionChecked { changed: false })
            .is_empty());
        assert_eq!(machine.phase(), SyncPhase::SessionCheck);
    }

    #[test]
    fn test_unified_fast_path() {
        let mut machine = in_cache_check();

        let commands = machine.advance(SyncEvent::CacheChecked {
            found: CacheFinding::Unified,
        });

        assert_eq!(commands, vec![Command::LoadServices]);
        assert_eq!(machine.phase(), SyncPhase::Ready);
        assert!(!commands.contains(&Command::MigrateLegacy));
        assert!(!commands.contains(&Command::Login));
    }

    #[test]
    fn test_legacy_triggers_migration_then_ready() {
        let mut machine = in_cache_check();

        assert_eq!(
            machine.advance(SyncEvent::CacheChecked {
                found: CacheFinding::Legacy
            }),
            vec![Command::MigrateLegacy]
        );
        assert_eq!(machine.phase(), SyncPhase::CacheCheck);

        assert_eq!(
            machine.advance(SyncEvent::MigrationCompleted { ok: true }),
            vec![Command::RecordIdentity, Command::LoadServices]
        );
        assert_eq!(machine.phase(), SyncPhase::Ready);
    }

    #[test]
    fn test_empty_cache_delegates_to_login() {
        let mut machine = in_cache_check();

        assert_eq!(
            machine.advance(SyncEvent::CacheChecked {
                found: CacheFinding::Empty
            }),
            vec![Command::Login]
        );
        assert_eq!(
            machine.advance(SyncEvent::LoginCompleted { ok: true }),
            vec![Command::RecordIdentity, Command::LoadServices]
        );
        assert!(machine.is_ready());
    }

    #[test]
    fn test_login_failure_stays_in_cache_check() {
        let mut machine = in_cache_check();
        machine.advance(SyncEvent::CacheChecked {
            found: CacheFinding::Empty,
        });

        assert!(machine
            .advance(SyncEvent::LoginCompleted { ok: false })
            .is_empty());

        assert_eq!(machine.phase(), SyncPhase::CacheCheck);
        assert_eq!(machine.halt_reason(), Some(HaltReason::LoginFailed));
        assert!(machine
            .advance(SyncEvent::LoginCompleted { ok: true })
            .is_empty());
        assert!(!machine.is_ready());
    }

    #[test]
    fn test_migration_failure_halts() {
        let mut machine = in_cache_check();
        machine.advance(SyncEvent::CacheChecked {
            found: CacheFinding::Legacy,
        });

        assert!(machine
            .advance(SyncEvent::MigrationCompleted { ok: false })
            .is_empty());
        assert_eq!(machine.halt_reason(), Some(HaltReason::MigrationFailed));
    }

    #[test]
    fn test_unavailable_cache_halts() {
        let mut machine = in_cache_check();

        assert!(machine
            .advance(SyncEvent::CacheChecked {
                found: CacheFinding::Unavailable
            })
            .is_empty());
        assert_eq!(machine.halt_reason(), Some(HaltReason::CacheUnavailable));
        assert_eq!(machine.phase(), SyncPhase::CacheCheck);
    }

    #[test]
    fn test_out_of_phase_events_are_ignored() {
        let mut machine = started();

        // cache result before the session check resolved
        assert!(machine
            .advance(SyncEvent::CacheChecked {
                found: CacheFinding::Unified
            })
            .is_empty());
        assert!(machine
            .advance(SyncEvent::LoginCompleted { ok: true })
            .is_empty());
        assert_eq!(machine.phase(), SyncPhase::SessionCheck);

        machine.advance(SyncEvent::SessionChecked { changed: false });

        // duplicate session result after moving on
        assert!(machine
            .advance(SyncEvent::SessionChecked { changed: true })
            .is_empty());
        assert_eq!(machine.phase(), SyncPhase::CacheCheck);
        assert!(!machine.is_halted());

        // login result while no login was requested
        assert!(machine
            .advance(SyncEvent::LoginCompleted { ok: true })
            .is_empty());
        assert_eq!(machine.phase(), SyncPhase::CacheCheck);
    }

    #[test]
    fn test_ready_is_terminal() {
        let mut machine = in_cache_check();
        machine.advance(SyncEvent::CacheChecked {
            found: CacheFinding::Unified,
        });

        assert!(machine
            .advance(SyncEvent::CacheChecked {
                found: CacheFinding::Empty
            })
            .is_empty());
        assert_eq!(machine.phase(), SyncPhase::Ready);
    }

    #[test]
    fn test_finding_priority() {
        assert_eq!(CacheFinding::from_presence(true, true, true), CacheFinding::Unified);
        assert_eq!(CacheFinding::from_presence(false, true, false), CacheFinding::Legacy);
        assert_eq!(CacheFinding::from_presence(false, false, true), CacheFinding::Legacy);
        assert_eq!(CacheFinding::from_presence(false, false, false), CacheFinding::Empty);
    }
}
