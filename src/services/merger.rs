//! Migration merger - legacy services + apps into the unified list
//!
//! Every well-formed token yields exactly one unified entry, in input order.
//! App metadata is attached when the token's `app_id` matches an app; a token
//! whose app cannot be resolved is still emitted, without metadata.

use crate::models::{
    AppEntry, AuthenticatorToken, CachedAppsPayload, CachedServicesPayload, UnifiedOtpService,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Merge result with counters for logging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub services: Vec<UnifiedOtpService>,
    /// Token records that failed to decode
    pub skipped_tokens: usize,
    /// App records that failed to decode
    pub skipped_apps: usize,
    /// Tokens dropped because an earlier token had the same id
    pub duplicate_tokens: usize,
    /// Emitted entries without resolved app metadata
    pub unresolved_apps: usize,
}

/// Merge the two legacy payloads
pub fn merge(services: &CachedServicesPayload, apps: &CachedAppsPayload) -> Vec<UnifiedOtpService> {
    merge_with_report(services, apps).services
}

pub fn merge_with_report(
    services: &CachedServicesPayload,
    apps: &CachedAppsPayload,
) -> MergeReport {
    let (tokens, skipped_tokens) =
        decode_records::<AuthenticatorToken>(&services.authenticator_tokens, "token");
    let (apps, skipped_apps) = decode_records::<AppEntry>(&apps.apps, "app");

    let mut report = merge_records_with_report(&tokens, &apps);
    report.skipped_tokens = skipped_tokens;
    report.skipped_apps = skipped_apps;
    report
}

/// Merge already-decoded records
pub fn merge_records(tokens: &[AuthenticatorToken], apps: &[AppEntry]) -> Vec<UnifiedOtpService> {
    merge_records_with_report(tokens, apps).services
}

fn merge_records_with_report(tokens: &[AuthenticatorToken], apps: &[AppEntry]) -> MergeReport {
    let mut apps_by_id: HashMap<i64, &AppEntry> = HashMap::with_capacity(apps.len());
    for app in apps {
        // first app with a given id wins
        apps_by_id.entry(app.id).or_insert(app);
    }

    let mut report = MergeReport::default();
    let mut seen: HashSet<&str> = HashSet::with_capacity(tokens.len());

    for token in tokens {
        if !seen.insert(token.id.as_str()) {
            warn!(token_id = %token.id, "duplicate token id in legacy services, keeping first");
            report.duplicate_tokens += 1;
            continue;
        }

        let app = token.app_id.and_then(|id| apps_by_id.get(&id).copied());
        if app.is_none() {
            debug!(token_id = %token.id, app_id = ?token.app_id, "no app metadata for token");
            report.unresolved_apps += 1;
        }

        report.services.push(UnifiedOtpService::from_token(token, app));
    }

    report
}

/// Decode raw records one by one, skipping the malformed ones
///
/// Returns the decoded records and the number skipped.
pub(crate) fn decode_records<T: DeserializeOwned>(raw: &[Value], what: &str) -> (Vec<T>, usize) {
    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = 0;

    for (index, value) in raw.iter().enumerate() {
        match serde_json::from_value::<T>(value.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(index, kind = what, error = %e, "skipping malformed legacy record");
                skipped += 1;
            }
        }
    }

    (records, skipped)
}
