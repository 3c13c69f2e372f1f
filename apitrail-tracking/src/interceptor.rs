//! Per-request interception lifecycle.
//!
//! One [`RequestInterceptor`] per in-flight request. The record opens at
//! [`start`](RequestInterceptor::start), picks up the error chain in
//! [`record_exception`](RequestInterceptor::record_exception) when the
//! handler raises, and is timed, policy-checked, redaction-complete and
//! persisted in [`finish`](RequestInterceptor::finish).
//!
//! Failure containment: the only errors that escape are those raised by
//! the delegated framework hooks, and only when hooks are not bypassed.
//! Every other internal fault degrades the record, never the request.

use crate::hooks::{FrameworkHooks, HandlerError};
use crate::request::{ParsedRequest, RawRequest};
use crate::response::Response;
use apitrail_core::redact::redact;
use apitrail_core::{EndpointConfig, RequestLog};
use apitrail_store::LogStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

/// Lifecycle state machine: no record → open record → closed.
///
/// `start` opens (re-opening overwrites — one record per interceptor per
/// request, no stacking); `record_exception` is an optional side branch;
/// `finish` closes. The record itself lives in `log`.
pub struct RequestInterceptor {
    hooks: Arc<dyn FrameworkHooks>,
    store: Arc<dyn LogStore>,
    endpoint: EndpointConfig,
    log: Option<RequestLog>,
}

impl RequestInterceptor {
    pub fn new(
        hooks: Arc<dyn FrameworkHooks>,
        store: Arc<dyn LogStore>,
        endpoint: EndpointConfig,
    ) -> Self {
        Self {
            hooks,
            store,
            endpoint,
            log: None,
        }
    }

    /// The currently open record, if any.
    pub fn record(&self) -> Option<&RequestLog> {
        self.log.as_ref()
    }

    /// Open a record for a request.
    ///
    /// The caller has already evaluated the exemption predicate — `start`
    /// is only invoked when logging should proceed. Query and body
    /// parameters are captured from the raw request and redacted here,
    /// before the handler runs.
    ///
    /// With `bypass_hooks = false`, delegates to the framework's
    /// pre-dispatch hook after the record is opened; a hook error
    /// propagates unchanged and the record stays open for the exception
    /// path.
    pub fn start(
        &mut self,
        raw: &RawRequest,
        parsed: &ParsedRequest,
        bypass_hooks: bool,
    ) -> Result<(), HandlerError> {
        let mut log = RequestLog::open(parsed.path.clone(), parsed.method.clone());
        log.remote_addr = resolve_remote_addr(raw);
        log.host = parsed.host.clone();

        let (view, view_method) = resolve_view(parsed);
        log.view = view;
        log.view_method = view_method;

        log.query_params = redact(&raw.query_map(), &self.endpoint.sensitive_fields);
        log.data = redact(&raw.body_map(), &self.endpoint.sensitive_fields);

        self.log = Some(log);

        let principal = if bypass_hooks {
            parsed.principal.clone()
        } else {
            self.hooks.pre_dispatch(parsed)?
        };
        if let Some(log) = self.log.as_mut() {
            log.user = principal.map(|p| p.username);
        }
        Ok(())
    }

    /// Record a handler error on the open record (no-op without one) and,
    /// unless bypassed, delegate to the framework's exception hook and
    /// return its response. In bypass mode the wrapper owns the response
    /// and `None` is returned.
    pub fn record_exception(
        &mut self,
        error: &HandlerError,
        bypass_hooks: bool,
    ) -> Option<Response> {
        if let Some(log) = self.log.as_mut() {
            log.errors = Some(format_error_chain(error));
        }
        if bypass_hooks {
            None
        } else {
            Some(self.hooks.on_exception(error))
        }
    }

    /// Close the record: compute timing, consult the decision policy,
    /// capture the rendered response best-effort, attempt persistence.
    ///
    /// Always returns the response unchanged — logging is invisible to
    /// the API caller. Calling `finish` again recomputes only timing and
    /// response fields; `requested_at` and `errors` are untouched.
    pub fn finish(
        &mut self,
        parsed: &ParsedRequest,
        response: Response,
        bypass_hooks: bool,
    ) -> Response {
        let response = if bypass_hooks {
            response
        } else {
            self.hooks.on_finalize(parsed, response)
        };

        let Some(log) = self.log.as_mut() else {
            return response;
        };

        log.response_ms = Some(log.elapsed_ms(Utc::now()));

        if self.endpoint.should_log(&log.method, Some(response.status)) {
            // Streaming responses cannot be rendered; both fields stay null.
            if let Some(body) = response.rendered() {
                log.response = Some(body.to_string());
                log.status_code = Some(response.status);
            }
            // Deliberate discard: a failed save drops the record, never
            // the request.
            if let Err(e) = self.store.save(log) {
                debug!(error = %e, path = %log.path, "Request log dropped, store rejected save");
            }
        }

        response
    }
}

/// First hop of the forwarded-for header, trimmed; else the direct peer
/// address; else empty.
fn resolve_remote_addr(raw: &RawRequest) -> String {
    if let Some(forwarded) = raw.header("x-forwarded-for") {
        let first = forwarded.split(',').next().unwrap_or("");
        return first.trim().to_string();
    }
    raw.remote_addr.clone().unwrap_or_default()
}

/// Best-effort handler identity. Never fails: an unresolvable handler
/// yields an empty identifier, a missing action falls back to the
/// lowercased HTTP method.
fn resolve_view(parsed: &ParsedRequest) -> (String, String) {
    let fallback = parsed.method.to_lowercase();
    match &parsed.handler {
        Some(handler) => {
            let action = handler
                .action
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or(fallback);
            (handler.identifier.clone(), action)
        }
        None => (String::new(), fallback),
    }
}

fn format_error_chain(error: &HandlerError) -> String {
    let mut out = error.to_string();
    for cause in error.chain().skip(1) {
        out.push_str("\nCaused by: ");
        out.push_str(&cause.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HandlerRef;
    use bytes::Bytes;
    use std::collections::HashMap;

    fn raw_with_headers(headers: &[(&str, &str)], remote: Option<&str>) -> RawRequest {
        RawRequest {
            method: "GET".into(),
            uri: "/".into(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            remote_addr: remote.map(|s| s.to_string()),
            body: Bytes::new(),
            principal: None,
        }
    }

    fn parsed(method: &str) -> ParsedRequest {
        ParsedRequest {
            method: method.into(),
            path: "/".into(),
            host: String::new(),
            query_params: HashMap::new(),
            principal: None,
            handler: None,
        }
    }

    // ── resolve_remote_addr ──────────────────────────────────────

    #[test]
    fn forwarded_for_first_hop_wins() {
        let raw = raw_with_headers(
            &[("X-Forwarded-For", "203.0.113.9, 10.0.0.1, 10.0.0.2")],
            Some("10.0.0.5"),
        );
        assert_eq!(resolve_remote_addr(&raw), "203.0.113.9");
    }

    #[test]
    fn peer_address_used_without_forwarded_header() {
        let raw = raw_with_headers(&[], Some("10.0.0.5"));
        assert_eq!(resolve_remote_addr(&raw), "10.0.0.5");
    }

    #[test]
    fn no_address_at_all_yields_empty() {
        let raw = raw_with_headers(&[], None);
        assert_eq!(resolve_remote_addr(&raw), "");
    }

    // ── resolve_view ─────────────────────────────────────────────

    #[test]
    fn missing_handler_falls_back_to_lowercase_method() {
        let (view, view_method) = resolve_view(&parsed("POST"));
        assert_eq!(view, "");
        assert_eq!(view_method, "post");
    }

    #[test]
    fn handler_with_action_resolves_fully() {
        let request =
            parsed("GET").with_handler(HandlerRef::new("items::ItemList").with_action("list"));
        let (view, view_method) = resolve_view(&request);
        assert_eq!(view, "items::ItemList");
        assert_eq!(view_method, "list");
    }

    #[test]
    fn handler_without_action_falls_back_to_method() {
        let request = parsed("DELETE").with_handler(HandlerRef::new("items::ItemDetail"));
        let (view, view_method) = resolve_view(&request);
        assert_eq!(view, "items::ItemDetail");
        assert_eq!(view_method, "delete");
    }

    #[test]
    fn empty_action_falls_back_to_method() {
        let request = parsed("GET").with_handler(HandlerRef::new("h").with_action(""));
        let (_, view_method) = resolve_view(&request);
        assert_eq!(view_method, "get");
    }

    // ── format_error_chain ───────────────────────────────────────

    #[test]
    fn error_chain_includes_causes() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = anyhow::Error::new(inner).context("handler blew up");
        let formatted = format_error_chain(&error);
        assert!(formatted.starts_with("handler blew up"));
        assert!(formatted.contains("Caused by: disk on fire"));
    }

    #[test]
    fn single_error_has_no_cause_lines() {
        let error = anyhow::anyhow!("plain failure");
        assert_eq!(format_error_chain(&error), "plain failure");
    }
}
