//! Call context extractor for axum.
//!
//! Builds a [`CallContext`] from request headers:
//! - `X-User-Id` - raw caller identity, interpreted later by the handlers
//! - `x-request-id` - correlation id, set by `SetRequestIdLayer` or the client
//!
//! The extractor never rejects. A missing or malformed identity is the
//! orchestrator's `INVALID_USER` outcome, not a transport failure.
//!
//! ```ignore
//! async fn handler(RequestContext(ctx): RequestContext) -> impl IntoResponse {
//!     let user = ctx.caller_id()?;
//! }
//! ```

use axum::http::HeaderMap;

use crate::domain::foundation::{CallContext, RequestId};

/// Header carrying the caller identity.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Header carrying the correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extractor wrapping the per-request [`CallContext`].
#[derive(Debug, Clone)]
pub struct RequestContext(pub CallContext);

impl RequestContext {
    /// Build a context from raw headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| RequestId::new(s).ok())
            .unwrap_or_else(RequestId::generate);

        let mut context = CallContext::new(request_id);
        if let Some(raw) = headers.get(USER_ID_HEADER) {
            // Non-UTF-8 values are kept as an unparseable identity.
            let caller = raw.to_str().unwrap_or("\u{FFFD}");
            context = context.with_caller(caller);
        }

        Self(context)
    }
}

impl<S> axum::extract::FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move { Ok(RequestContext::from_headers(&parts.headers)) })
    }
}
