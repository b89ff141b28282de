//! Billing error types.

use axum::http::StatusCode;
use thiserror::Error;

use super::outcome::Outcome;
use crate::domain::foundation::IdentityError;

/// Failures of a subscription lifecycle operation.
///
/// Each variant belongs to exactly one [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    #[error("Invalid user: {0}")]
    InvalidUser(#[from] IdentityError),

    #[error("Plan {0} is not in the catalog")]
    InvalidPlan(i32),

    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SubscriptionError {
    pub fn invalid_payment_method(reason: impl Into<String>) -> Self {
        SubscriptionError::InvalidPaymentMethod(reason.into())
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        SubscriptionError::Internal(reason.into())
    }

    /// The outcome this failure reports to callers.
    pub fn outcome(&self) -> Outcome {
        match self {
            SubscriptionError::InvalidUser(_) => Outcome::InvalidUser,
            SubscriptionError::InvalidPlan(_) => Outcome::InvalidPlan,
            SubscriptionError::InvalidPaymentMethod(_) => Outcome::InvalidPaymentMethod,
            SubscriptionError::Internal(_) => Outcome::InternalError,
        }
    }
}

/// Errors that occur during webhook ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// The request carried no signature header.
    #[error("Missing signature")]
    MissingSignature,

    /// Signature, timestamp or payload failed verification.
    #[error("Invalid webhook: {0}")]
    InvalidSignature(String),

    /// Verification could not be performed.
    #[error("Webhook processing failed: {0}")]
    Processing(String),
}

impl WebhookError {
    /// Maps the error to an HTTP status code.
    ///
    /// Stripe retries deliveries that receive a 5xx.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Processing(_))
    }
}
