//! Service layer for the startup sequence
//!
//! Each service is a small unit of business logic over the injected store.
//! The state driver composes them; none of them knows about phases.

pub mod legacy_reader;
pub mod merger;
pub mod session_guard;

// Re-export commonly used types
pub use legacy_reader::{LegacyKind, LegacyPayload, LegacyReader};
pub use merger::{merge, merge_records, merge_with_report, MergeReport};
pub use session_guard::{SessionGuard, SessionStatus};
