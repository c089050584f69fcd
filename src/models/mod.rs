pub mod app;
pub mod otp_service;
pub mod session;
pub mod token;

pub use app::{AppEntry, CachedAppsPayload};
pub use otp_service::{AppMetadata, UnifiedOtpService};
pub use session::{same_identity, SessionRecord};
pub use token::{AuthenticatorToken, CachedServicesPayload};
