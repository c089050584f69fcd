//! App entries: grouping and display metadata that tokens belong to

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppEntry {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Legacy apps payload, stored verbatim as the remote API returned it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CachedAppsPayload {
    #[serde(default)]
    pub apps: Vec<serde_json::Value>,
}

impl CachedAppsPayload {
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
