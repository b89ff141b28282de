//! HTTP adapter for the payment service.
//!
//! Exposes the subscription lifecycle via JSON RPC endpoints:
//! - `POST /payment.PaymentService/CreateSubscription`
//! - `POST /payment.PaymentService/CancelSubscription`
//! - `POST /payment.PaymentService/GetSubscription`
//! - `POST /payment.PaymentService/ConfirmPaymentIntent`
//! - `POST /webhooks/stripe` - Handle Stripe webhooks

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod rpc_status;

pub use handlers::{BillingApiError, BillingAppState, WebhookApiError, STRIPE_SIGNATURE_HEADER};
pub use routes::{billing_router, payment_service_routes, webhook_routes};
pub use rpc_status::{outcome_message, RpcCode};
