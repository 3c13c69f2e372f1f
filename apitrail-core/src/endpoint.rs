use crate::policy::LogPolicy;
use serde::{Deserialize, Serialize};

/// HTTP methods recognised by the logging method filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Connect,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Trace => "TRACE",
        }
    }
}

/// Per-endpoint logging configuration.
///
/// Immutable once constructed — one value per endpoint per deployment,
/// shared by reference across requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Methods to log (empty = all methods).
    #[serde(default)]
    pub logging_methods: Vec<HttpMethod>,

    /// Additional redaction keys beyond the built-in sensitive set.
    #[serde(default)]
    pub sensitive_fields: Vec<String>,

    /// Persistence decision variant.
    #[serde(default)]
    pub policy: LogPolicy,
}

impl EndpointConfig {
    /// Check if a given HTTP method passes the logging method set.
    pub fn method_logged(&self, method: &str) -> bool {
        if self.logging_methods.is_empty() {
            return true;
        }
        self.logging_methods
            .iter()
            .any(|m| m.as_str().eq_ignore_ascii_case(method))
    }

    /// Should a record for this request be persisted, given the response
    /// status (if a response was produced)?
    ///
    /// `ErrorsOnly` looks only at the status, mirroring the errors-only
    /// variant's full override of the default decision.
    pub fn should_log(&self, method: &str, status: Option<u16>) -> bool {
        match self.policy {
            LogPolicy::AllRequests => self.method_logged(method),
            LogPolicy::ErrorsOnly => matches!(status, Some(s) if s >= 400),
        }
    }
}
