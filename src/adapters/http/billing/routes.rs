//! Axum router configuration for payment service endpoints.
//!
//! RPC methods are exposed as JSON POST endpoints under
//! `/payment.PaymentService/<Method>`. Webhooks live under `/webhooks`.

use axum::{routing::post, Router};

use super::handlers::{
    cancel_subscription, confirm_payment_intent, create_subscription, get_subscription,
    handle_stripe_webhook, BillingAppState,
};

/// Create the RPC router.
///
/// # Routes
/// - `POST /payment.PaymentService/CreateSubscription`
/// - `POST /payment.PaymentService/CancelSubscription`
/// - `POST /payment.PaymentService/GetSubscription`
/// - `POST /payment.PaymentService/ConfirmPaymentIntent`
pub fn payment_service_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/CreateSubscription", post(create_subscription))
        .route("/CancelSubscription", post(cancel_subscription))
        .route("/GetSubscription", post(get_subscription))
        .route("/ConfirmPaymentIntent", post(confirm_payment_intent))
}

/// Create the Stripe webhook router.
///
/// Separate from the RPC routes because webhooks carry no caller identity
/// (they are verified via signature).
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Create the complete billing router.
///
/// ```ignore
/// let app = billing_router().with_state(BillingAppState::new(processor, secret));
/// ```
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/payment.PaymentService", payment_service_routes())
        .nest("/webhooks", webhook_routes())
}
