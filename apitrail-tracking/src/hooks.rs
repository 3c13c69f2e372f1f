use crate::request::ParsedRequest;
use crate::response::Response;
use apitrail_core::Principal;

/// An error raised by request handling. Opaque to the logging layer; only
/// its formatted chain is recorded.
pub type HandlerError = anyhow::Error;

/// The framework's native request-lifecycle hooks.
///
/// The interceptor delegates to these unless driven in bypass mode by an
/// out-of-band wrapper, which owns the lifecycle itself. One interceptor
/// type, boolean-gated delegation — not two interceptor variants.
pub trait FrameworkHooks: Send + Sync {
    /// Pre-dispatch processing (authentication, throttling, …).
    /// Returns the authenticated principal, or an error which the
    /// interceptor propagates to the caller unchanged.
    fn pre_dispatch(&self, request: &ParsedRequest) -> Result<Option<Principal>, HandlerError>;

    /// Convert a handler error into the framework's error response.
    fn on_exception(&self, error: &HandlerError) -> Response;

    /// Response finalisation (content negotiation, rendering).
    fn on_finalize(&self, request: &ParsedRequest, response: Response) -> Response;
}

/// Hooks placeholder for bypass mode — never invoked by the interceptor
/// when every lifecycle call passes `bypass_hooks = true`.
pub struct NoopHooks;

impl FrameworkHooks for NoopHooks {
    fn pre_dispatch(&self, _request: &ParsedRequest) -> Result<Option<Principal>, HandlerError> {
        Ok(None)
    }

    fn on_exception(&self, _error: &HandlerError) -> Response {
        Response::new(500, "")
    }

    fn on_finalize(&self, _request: &ParsedRequest, response: Response) -> Response {
        response
    }
}
