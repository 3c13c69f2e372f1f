//! Sensitive-field redaction for captured request data.
//!
//! Matched values are replaced with a fixed-length mask; the key is kept so
//! downstream consumers can still see the field existed. Matching is
//! case-insensitive against a built-in credential/secret key set unioned with
//! any caller-supplied extras.

use serde_json::Value;
use std::collections::HashMap;

/// Replacement written in place of every masked value.
pub const CLEANED_SUBSTITUTE: &str = "********************";

/// Field names that are **always** masked, regardless of configuration.
///
/// These carry credentials, tokens, or signing material and must never
/// appear in plaintext in a persisted record.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "api",
    "api_key",
    "token",
    "access_token",
    "refresh_token",
    "key",
    "secret",
    "password",
    "old_password",
    "new_password",
    "signature",
    "authorization",
];

/// Whether a field name is sensitive, either built-in or via `extra`.
pub fn is_sensitive(key: &str, extra: &[String]) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_FIELDS.contains(&lower.as_str())
        || extra.iter().any(|e| e.to_lowercase() == lower)
}

/// Mask sensitive values in a key/value mapping.
///
/// Operates on a shallow copy — the caller's mapping is never mutated, and
/// non-matching values pass through with their original type. Irreversible:
/// the returned mapping holds no trace of a masked original.
pub fn redact(data: &HashMap<String, Value>, extra: &[String]) -> HashMap<String, Value> {
    data.iter()
        .map(|(key, value)| {
            if is_sensitive(key, extra) {
                (key.clone(), Value::String(CLEANED_SUBSTITUTE.to_string()))
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}
