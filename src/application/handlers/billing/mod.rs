//! Billing handlers - subscription lifecycle commands and queries.

mod cancel_subscription;
mod confirm_payment_intent;
mod create_subscription;
mod get_subscription;
mod handle_processor_webhook;

pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use confirm_payment_intent::{
    ConfirmPaymentIntentCommand, ConfirmPaymentIntentHandler, ConfirmPaymentIntentResult,
};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery};
pub use handle_processor_webhook::{
    HandleProcessorWebhookCommand, HandleProcessorWebhookHandler, HandleProcessorWebhookResult,
};
