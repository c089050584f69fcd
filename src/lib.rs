// otpsync - startup synchronization for a command-palette OTP extension
// Decides on every launch whether cached OTP data is usable, migrates the
// legacy split cache, and gates rendering until data is ready.

pub mod auth;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod ui;

pub use anyhow::{Context, Result};

// Re-export commonly used types
pub use config::SyncConfig;
pub use models::{AppEntry, AuthenticatorToken, UnifiedOtpService};
pub use state::{SyncDriver, SyncOutcome, SyncPhase};
pub use store::{KeyValueStore, StoreKeys};
pub use ui::SyncView;
