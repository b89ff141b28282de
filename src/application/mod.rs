//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::billing::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
    ConfirmPaymentIntentCommand, ConfirmPaymentIntentHandler, ConfirmPaymentIntentResult,
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
    GetSubscriptionHandler, GetSubscriptionQuery, HandleProcessorWebhookCommand,
    HandleProcessorWebhookHandler, HandleProcessorWebhookResult,
};
