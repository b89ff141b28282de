//! Stripe payment processor adapter.
//!
//! Implements the `PaymentProcessor` port for Stripe, including:
//! - Customer lookup and creation keyed by caller id
//! - Payment method attachment
//! - Subscription create, fetch and cancel
//! - Payment intent confirmation
//! - Webhook signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - The API key is handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! Read from the `payment` config section:
//! - `PAYMENT_SERVICE__PAYMENT__STRIPE_API_KEY`
//! - `PAYMENT_SERVICE__PAYMENT__STRIPE_WEBHOOK_SECRET`

mod mock_payment_processor;
mod stripe_adapter;
mod webhook_types;

pub use mock_payment_processor::{MethodCall, MockPaymentProcessor};
pub use stripe_adapter::{StripeConfig, StripeProcessor};
pub use webhook_types::{SignatureHeader, SignatureParseError, StripeWebhookEvent};
