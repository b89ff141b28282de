//! Payment processor port.
//!
//! Defines the contract for the external billing processor (Stripe).
//! Implementations own nothing but their credential and HTTP client.
//!
//! # Design
//!
//! - **Narrow surface**: only the calls the subscription lifecycle needs
//! - **No retries**: every method issues at most one processor request
//! - **Not found is data**: lookups return `Ok(None)` for missing objects

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::billing::{ProcessorEvent, ProcessorStatus};
use crate::domain::foundation::UserId;

/// Port for payment processor integrations.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Find the customer created for a caller, keyed by `metadata.user_id`.
    async fn find_customer(&self, user_id: &UserId) -> Result<Option<Customer>, PaymentError>;

    /// Create a customer recording the caller id as metadata.
    async fn create_customer(&self, request: CreateCustomerRequest)
        -> Result<Customer, PaymentError>;

    /// Attach a payment method to a customer.
    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> Result<PaymentMethod, PaymentError>;

    /// Make a payment method the customer's default for invoices.
    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<Customer, PaymentError>;

    /// Create a subscription with deferred payment confirmation.
    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, PaymentError>;

    /// Get subscription by processor id.
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Subscription>, PaymentError>;

    /// Cancel a subscription immediately.
    async fn cancel_subscription(&self, subscription_id: &str)
        -> Result<Subscription, PaymentError>;

    /// Get payment intent by processor id.
    async fn get_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PaymentIntent>, PaymentError>;

    /// Confirm a payment intent.
    async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, PaymentError>;

    /// Verify a webhook signature against `secret` and parse the event.
    fn construct_event(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> Result<ProcessorEvent, PaymentError>;
}

/// Request to create a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Caller id, stored as `metadata[user_id]`.
    pub user_id: UserId,

    pub description: String,
}

impl CreateCustomerRequest {
    /// Standard request for a caller.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            description: format!("Customer for user {}", user_id),
        }
    }
}

/// Customer in the payment system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Provider's customer ID.
    pub id: String,

    pub description: Option<String>,

    /// Customer's default invoice payment method.
    pub default_payment_method: Option<String>,

    /// When the customer was created (provider timestamp).
    pub created_at: i64,
}

/// Payment method attached to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub customer_id: Option<String>,
}

/// Request to create a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    /// Provider's customer ID.
    pub customer_id: String,

    /// Price billed by the single subscription item.
    pub price_id: String,
}

/// Subscription in the payment system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Provider's subscription ID.
    pub id: String,

    /// Provider's customer ID.
    pub customer_id: String,

    pub status: ProcessorStatus,

    /// Current period end, when the processor reports one at this level.
    pub current_period_end: Option<i64>,

    pub items: Vec<SubscriptionItem>,

    /// Payment intent of the latest invoice, when expanded.
    pub latest_payment_intent: Option<String>,
}

impl Subscription {
    /// Price of the first item.
    pub fn primary_price(&self) -> Option<&str> {
        self.items.first().map(|i| i.price_id.as_str())
    }

    /// Authoritative period end from the subscription or its first item.
    pub fn reported_period_end(&self) -> Option<i64> {
        self.current_period_end
            .or_else(|| self.items.first().and_then(|i| i.current_period_end))
            .filter(|ts| *ts > 0)
    }
}

/// Single subscription item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionItem {
    pub id: String,
    pub price_id: String,
    pub current_period_end: Option<i64>,
}

/// Payment intent in the payment system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: PaymentIntentStatus,
}

/// Payment intent status from payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    Unknown(String),
}

impl PaymentIntentStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            "requires_action" => Self::RequiresAction,
            "processing" => Self::Processing,
            "requires_capture" => Self::RequiresCapture,
            "canceled" => Self::Canceled,
            "succeeded" => Self::Succeeded,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Unknown(s) => s,
        }
    }
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create a provider API error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create an error for a request rejected before reaching the provider.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    /// Create an invalid webhook error.
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }

    /// Whether a later identical request could succeed.
    pub fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Request rejected by the processor (bad card, bad parameters).
    CardError,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Malformed request parameters (bad object id, unknown field).
    InvalidRequest,

    /// Invalid webhook signature or payload.
    InvalidWebhook,

    /// Provider API error.
    ProviderError,
}

impl PaymentErrorCode {
    /// Maps a Stripe error `type` to a code.
    pub fn from_stripe_type(error_type: &str) -> Self {
        match error_type {
            "card_error" => PaymentErrorCode::CardError,
            "authentication_error" => PaymentErrorCode::AuthenticationError,
            "rate_limit_error" => PaymentErrorCode::RateLimitExceeded,
            "invalid_request_error" => PaymentErrorCode::InvalidRequest,
            _ => PaymentErrorCode::ProviderError,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::CardError => "card_error",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
