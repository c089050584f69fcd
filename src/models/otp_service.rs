//! Unified OTP service: the only representation consumed after migration

use super::{AppEntry, AuthenticatorToken};
use serde::{Deserialize, Serialize};

/// Display metadata resolved from the owning app
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&AppEntry> for AppMetadata {
    fn from(app: &AppEntry) -> Self {
        Self {
            name: app.name.clone(),
            icon: app.icon.clone(),
            url: app.url.clone(),
        }
    }
}

/// One entry per OTP-bearing account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnifiedOtpService {
    pub id: String,
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// `None` when the token's app could not be resolved
    #[serde(default)]
    pub app: Option<AppMetadata>,
}

impl UnifiedOtpService {
    /// Build a unified entry from a token and its (optional) resolved app
    pub fn from_token(token: &AuthenticatorToken, app: Option<&AppEntry>) -> Self {
        Self {
            id: token.id.clone(),
            secret: token.secret.clone(),
            account: token.account.clone(),
            issuer: token.issuer.clone(),
            algorithm: token.algorithm.clone(),
            digits: token.digits,
            period: token.period,
            kind: token.kind.clone(),
            app: app.map(AppMetadata::from),
        }
    }

    /// Name shown in list views: app name, then issuer, then the token id
    pub fn display_name(&self) -> &str {
        self.app
            .as_ref()
            .map(|app| app.name.as_str())
            .or(self.issuer.as_deref())
            .unwrap_or(&self.id)
    }
}
