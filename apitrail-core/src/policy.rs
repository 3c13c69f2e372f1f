use serde::{Deserialize, Serialize};

/// Persistence decision variant, evaluated at finalize time only.
///
/// Gates the response-capture step, not record creation: a request that
/// raised before a response existed is still recorded by the exception path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPolicy {
    /// Persist every request whose method passes the endpoint's method set.
    #[default]
    AllRequests,
    /// Persist only requests whose response status is an error (>= 400).
    ErrorsOnly,
}
