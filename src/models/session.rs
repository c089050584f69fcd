//! Session identity recorded alongside cached data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the account that populated the cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub email: String,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            recorded_at: Some(Utc::now()),
        }
    }

    /// Whether `other` names the same account (trimmed, case-insensitive)
    pub fn matches(&self, other: &str) -> bool {
        same_identity(&self.email, other)
    }
}

pub fn same_identity(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
