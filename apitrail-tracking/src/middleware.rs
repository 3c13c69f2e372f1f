//! Out-of-band wrapper driving the interceptor in bypass mode.
//!
//! Sits outside the framework's native request lifecycle: it normalizes
//! the raw request itself, never delegates to the framework hooks, and
//! owns the error response when a handler raises. Log output is
//! equivalent to the native-hooks path.

use crate::hooks::{HandlerError, NoopHooks};
use crate::interceptor::RequestInterceptor;
use crate::request::{ParsedRequest, RawRequest};
use crate::response::Response;
use crate::shim;
use apitrail_core::{EndpointRegistry, Principal};
use apitrail_store::LogStore;
use std::sync::Arc;
use tracing::warn;

/// Exemption predicate, injected by the deployment (e.g. a superuser
/// check). Evaluated before any record is opened.
pub type ExemptPredicate = Arc<dyn Fn(Option<&Principal>) -> bool + Send + Sync>;

pub struct TrackingMiddleware {
    store: Arc<dyn LogStore>,
    endpoints: Arc<EndpointRegistry>,
    exempt: ExemptPredicate,
}

impl TrackingMiddleware {
    /// Middleware that logs every non-exempt request. By default nothing
    /// is exempt.
    pub fn new(store: Arc<dyn LogStore>, endpoints: Arc<EndpointRegistry>) -> Self {
        Self {
            store,
            endpoints,
            exempt: Arc::new(|_| false),
        }
    }

    pub fn with_exempt(mut self, exempt: ExemptPredicate) -> Self {
        self.exempt = exempt;
        self
    }

    /// Run one request through dispatch with logging wrapped around it.
    ///
    /// A fresh interceptor is built per call — no state is shared between
    /// concurrent requests beyond the store and the read-only endpoint
    /// configuration.
    pub fn handle<F>(&self, raw: &RawRequest, dispatch: F) -> Response
    where
        F: FnOnce(&ParsedRequest) -> Result<Response, HandlerError>,
    {
        let parsed = shim::normalize(raw);

        if (self.exempt)(parsed.principal.as_ref()) {
            return match dispatch(&parsed) {
                Ok(response) => response,
                Err(error) => error_response(&error),
            };
        }

        let endpoint = self.endpoints.resolve(&parsed.path).clone();
        let mut interceptor =
            RequestInterceptor::new(Arc::new(NoopHooks), Arc::clone(&self.store), endpoint);

        // Hooks are bypassed on every call below, so start cannot fail.
        let _ = interceptor.start(raw, &parsed, true);

        let response = match dispatch(&parsed) {
            Ok(response) => response,
            Err(error) => {
                interceptor.record_exception(&error, true);
                error_response(&error)
            }
        };

        interceptor.finish(&parsed, response, true)
    }
}

/// The wrapper owns the error response in bypass mode.
fn error_response(error: &HandlerError) -> Response {
    warn!(error = %error, "Handler raised, returning 500");
    Response::new(500, format!(r#"{{"error":"{}"}}"#, error))
}
