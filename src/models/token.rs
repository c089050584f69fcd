//! Authenticator tokens as returned by the remote service and cached by the
//! previous extension release.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// A single OTP-bearing token record
///
/// Only `id` and `secret` are required when decoding. Optional fields holding
/// a value of the wrong type are dropped with a warning instead of rejecting
/// the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "RawToken")]
pub struct AuthenticatorToken {
    /// Stable token identifier
    pub id: String,

    /// Opaque OTP secret
    pub secret: String,

    /// Linkage to the owning [`AppEntry`](super::AppEntry)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<i64>,

    /// Account label (usually the login name at the issuer)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Hash algorithm name, e.g. `SHA1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub digits: Option<u32>,

    /// Code rotation period in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u64>,

    /// `totp`, `hotp`, ...
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Deserialize)]
struct RawToken {
    id: String,
    secret: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawToken> for AuthenticatorToken {
    fn from(raw: RawToken) -> Self {
        let RawToken { id, secret, mut rest } = raw;

        let app_id = take_field(&mut rest, &id, "appId", as_integer)
            .or(take_field(&mut rest, &id, "app_id", as_integer));

        Self {
            app_id,
            account: take_field(&mut rest, &id, "account", as_text),
            issuer: take_field(&mut rest, &id, "issuer", as_text),
            algorithm: take_field(&mut rest, &id, "algorithm", as_text),
            digits: take_field(&mut rest, &id, "digits", as_count)
                .and_then(|n| u32::try_from(n).ok()),
            period: take_field(&mut rest, &id, "period", as_count),
            kind: take_field(&mut rest, &id, "type", as_text),
            id,
            secret,
        }
    }
}

fn take_field<T>(
    rest: &mut Map<String, Value>,
    token_id: &str,
    field: &str,
    parse: fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = rest.remove(field)?;
    if value.is_null() {
        return None;
    }

    let parsed = parse(&value);
    if parsed.is_none() {
        warn!(token_id, field, %value, "ignoring unreadable token field");
    }
    parsed
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Integers, whole floats and numeric strings
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_count(value: &Value) -> Option<u64> {
    as_integer(value).and_then(|n| u64::try_from(n).ok())
}

/// Legacy services payload, stored verbatim as the remote API returned it
///
/// Records stay raw until merge so a single malformed record cannot make the
/// whole payload unreadable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CachedServicesPayload {
    #[serde(default)]
    pub authenticator_tokens: Vec<serde_json::Value>,
}

impl CachedServicesPayload {
    pub fn len(&self) -> usize {
        self.authenticator_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authenticator_tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_accepts_camel_case_app_id() {
        let token: AuthenticatorToken =
            serde_json::from_value(json!({"id": "A", "secret": "X", "appId": 1})).unwrap();

        assert_eq!(token.app_id, Some(1));
        assert_eq!(token.account, None);
    }

    #[test]
    fn test_token_type_field_maps_to_kind() {
        let token: AuthenticatorToken = serde_json::from_value(json!({
            "id": "A",
            "secret": "X",
            "type": "totp",
            "digits": 6,
            "period": 30
        }))
        .unwrap();

        assert_eq!(token.kind.as_deref(), Some("totp"));
        assert_eq!(token.digits, Some(6));

        let value = serde_json::to_value(&token).unwrap();
        assert_eq!(value["type"], "totp");
        assert!(value.get("app_id").is_none());
    }

    #[test]
    fn test_mistyped_optional_fields_are_dropped() {
        let token: AuthenticatorToken = serde_json::from_value(json!({
            "id": "A",
            "secret": "X",
            "account": 42,
            "digits": -6,
            "period": 30.0,
            "type": null
        }))
        .unwrap();

        assert_eq!(token.id, "A");
        assert_eq!(token.secret, "X");
        assert_eq!(token.account, None);
        assert_eq!(token.digits, None);
        assert_eq!(token.period, Some(30));
        assert_eq!(token.kind, None);
    }

    #[test]
    fn test_app_id_accepts_numeric_string() {
        let token: AuthenticatorToken =
            serde_json::from_value(json!({"id": "A", "secret": "X", "appId": " 7 "})).unwrap();
        assert_eq!(token.app_id, Some(7));

        let token: AuthenticatorToken =
            serde_json::from_value(json!({"id": "A", "secret": "X", "appId": "bank"})).unwrap();
        assert_eq!(token.app_id, None);
    }

    #[test]
    fn test_both_app_id_spellings_prefer_camel_case() {
        let token: AuthenticatorToken = serde_json::from_value(json!({
            "id": "A",
            "secret": "X",
            "appId": 1,
            "app_id": 2
        }))
        .unwrap();
        assert_eq!(token.app_id, Some(1));

        let token: AuthenticatorToken = serde_json::from_value(json!({
            "id": "A",
            "secret": "X",
            "appId": "?",
            "app_id": 2
        }))
        .unwrap();
        assert_eq!(token.app_id, Some(2));
    }

    #[test]
    fn test_serialized_token_decodes_back() {
        let token: AuthenticatorToken = serde_json::from_value(json!({
            "id": "A",
            "secret": "X",
            "appId": 3,
            "type": "totp"
        }))
        .unwrap();

        let value = serde_json::to_value(&token).unwrap();
        assert_eq!(serde_json::from_value::<AuthenticatorToken>(value).unwrap(), token);
    }

    #[test]
    fn test_token_without_secret_is_rejected() {
        let result = serde_json::from_value::<AuthenticatorToken>(json!({"id": "A"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_services_payload_missing_list_is_empty() {
        let payload: CachedServicesPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.is_empty());
    }
}
