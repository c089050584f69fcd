//! Startup state
//!
//! Handles the per-launch synchronization sequence:
//! - Phase transitions (pure machine)
//! - Command execution against store and collaborators (driver)
//! - Publishing the observable view

mod driver;
mod machine;

pub use driver::{Collaborators, SyncDriver, SyncOptions, SyncOutcome};
pub use machine::{CacheFinding, Command, HaltReason, SyncEvent, SyncMachine, SyncPhase};
