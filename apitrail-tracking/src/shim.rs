//! Adapter from the transport-level request to the framework-parsed form.
//!
//! Used when the interceptor is driven from the out-of-band wrapper, which
//! only sees the raw request. Idempotent and side-effect-free: the raw
//! body is `Bytes`, so nothing here consumes it — the interceptor captures
//! body data from the raw form independently of this conversion.

use crate::request::{ParsedRequest, RawRequest};

/// Build the framework-parsed view of a raw request.
///
/// The handler is left unresolved — out-of-band the dispatch table is not
/// available, and view resolution tolerates its absence.
pub fn normalize(raw: &RawRequest) -> ParsedRequest {
    ParsedRequest {
        method: raw.method.clone(),
        path: raw.path().to_string(),
        host: raw.header("host").unwrap_or("").to_string(),
        query_params: raw.query_map(),
        principal: raw.principal.clone(),
        handler: None,
    }
}
