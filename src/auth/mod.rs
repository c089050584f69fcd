//! Collaborators consumed by the startup sequence
//!
//! The remote account, the network login and the logout flow live outside this
//! crate. They are reached through the traits below; [`local`] holds the
//! implementations the command-line binary uses.

pub mod local;

use crate::Result;
use async_trait::async_trait;

pub use local::{ConfiguredPrincipal, ImportLoginFlow, RemoteExport, StoreLogout};

/// The currently authenticated account
#[async_trait]
pub trait Principal: Send + Sync {
    /// Identity (email) of the authenticated account, `None` when signed out
    async fn current_identity(&self) -> Result<Option<String>>;
}

/// Fetches fresh OTP data when nothing usable is cached
///
/// A successful login is expected to have written the unified payload itself.
#[async_trait]
pub trait LoginFlow: Send + Sync {
    async fn login(&self) -> Result<()>;
}

/// Returns the user to a signed-out state
#[async_trait]
pub trait LogoutFlow: Send + Sync {
    async fn logout(&self) -> Result<()>;
}
