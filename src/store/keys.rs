use serde::{Deserialize, Serialize};

/// The four keys the startup sequence reads and writes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreKeys {
    /// Legacy services payload
    pub services: String,
    /// Legacy apps payload
    pub apps: String,
    /// Unified OTP service list
    pub unified: String,
    /// Session identity record
    pub session: String,
}

impl StoreKeys {
    pub fn all(&self) -> [&str; 4] {
        [&self.services, &self.apps, &self.unified, &self.session]
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            services: "services".to_string(),
            apps: "apps".to_string(),
            unified: "otp-services".to_string(),
            session: "user".to_string(),
        }
    }
}
