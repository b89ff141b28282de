//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `stripe` - Stripe REST client and an in-memory mock of the processor port
//! - `http` - Axum endpoints for the RPC methods and processor webhooks

pub mod http;
pub mod stripe;

pub use stripe::{MockPaymentProcessor, StripeConfig, StripeProcessor};
