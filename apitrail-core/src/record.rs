//! The audit record written for one logged request.
//!
//! A [`RequestLog`] is opened in memory when interception starts, mutated by
//! the interceptor lifecycle (exception handler, finalizer), and handed to
//! the durable store exactly once, at finalize time. Every field is
//! serialisable to JSON so records can be persisted as-is by any backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// One row per logged request.
///
/// Instances are created via [`RequestLog::open`] at interception start and
/// filled in by the interceptor before being saved.
///
/// # Redaction notice
/// `query_params` and `data` are captured *already redacted* — the record
/// never holds an unmasked sensitive value, so a persisted row is safe to
/// ship downstream without further scrubbing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLog {
    /// Unique record identifier (UUID v4), assigned at open.
    pub id: String,
    /// When interception started. Set exactly once, never mutated after.
    pub requested_at: DateTime<Utc>,

    // ── Request ───────────────────────────────────────────────────
    /// Request path, without the query string.
    pub path: String,
    /// Best-effort resolved handler identity. Empty when unresolvable.
    pub view: String,
    /// The handler's logical action name, or the HTTP method lowercased
    /// when no action is declared.
    pub view_method: String,
    /// Client address: first hop of the forwarded-for header, else the
    /// direct peer address, else empty.
    pub remote_addr: String,
    /// Value of the Host header.
    pub host: String,
    /// HTTP method (uppercase: `GET`, `POST`, …).
    pub method: String,
    /// Query parameters, redacted at capture time.
    pub query_params: HashMap<String, Value>,
    /// Body parameters, redacted and captured before dispatch — later
    /// framework processing may consume or alter the body.
    pub data: HashMap<String, Value>,

    // ── Outcome ───────────────────────────────────────────────────
    /// Authenticated principal identifier. `None` when anonymous.
    pub user: Option<String>,
    /// Formatted error chain. Set only when the handler raised.
    pub errors: Option<String>,
    /// Rendered response body. `None` when rendering failed (streaming
    /// responses) or the decision policy declined response capture.
    pub response: Option<String>,
    /// HTTP response status code.
    pub status_code: Option<u16>,
    /// Elapsed whole milliseconds from `requested_at` to finalize time.
    pub response_ms: Option<i64>,
}

impl RequestLog {
    /// Open a record for a request. Remaining fields are filled in by the
    /// interceptor before the record is saved.
    pub fn open(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            requested_at: Utc::now(),
            path: path.into(),
            view: String::new(),
            view_method: String::new(),
            remote_addr: String::new(),
            host: String::new(),
            method: method.into(),
            query_params: HashMap::new(),
            data: HashMap::new(),
            user: None,
            errors: None,
            response: None,
            status_code: None,
            response_ms: None,
        }
    }

    /// Whole milliseconds from `requested_at` to `now`, clamped at zero.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.requested_at).num_milliseconds().max(0)
    }

    /// Serialise to a compact JSON line suitable for append-only storage.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
