//! Request-scoped call context.
//!
//! Every orchestrator entry point receives a [`CallContext`] explicitly. It
//! carries the raw caller identity exactly as the transport received it and a
//! correlation id for logging. Identity is only interpreted on demand through
//! [`CallContext::caller_id`], which has no side effects.

use thiserror::Error;

use super::{RequestId, UserId, ValidationError};

/// Reasons a caller identity cannot be recovered from a context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("No caller identity attached to the call")]
    Missing,

    #[error("Caller identity is malformed: {0}")]
    Malformed(#[from] ValidationError),
}

/// Context attached to a single inbound call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    caller: Option<String>,
    request_id: RequestId,
}

impl CallContext {
    /// Creates an anonymous context with the given correlation id.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            caller: None,
            request_id,
        }
    }

    /// Creates a context for an already-resolved caller.
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            caller: Some(user_id.to_string()),
            request_id: RequestId::generate(),
        }
    }

    /// Attaches the raw identity value supplied by the transport.
    pub fn with_caller(mut self, raw: impl Into<String>) -> Self {
        self.caller = Some(raw.into());
        self
    }

    /// Replaces the correlation id.
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Correlation id for this call.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Recovers the numeric caller identity.
    ///
    /// Absence and a value that is not a base-10 `i64` are both failures.
    pub fn caller_id(&self) -> Result<UserId, IdentityError> {
        let raw = self.caller.as_deref().ok_or(IdentityError::Missing)?;
        Ok(raw.parse::<UserId>()?)
    }
}
