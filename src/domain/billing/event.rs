//! Verified processor webhook events.

use serde::{Deserialize, Serialize};

/// Event types the webhook dispatcher distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    PaymentSucceeded,
    PaymentFailed,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
    /// Any other event type, kept verbatim.
    Unhandled(String),
}

impl EventKind {
    /// Parse event type from the Stripe type string.
    pub fn from_type(s: &str) -> Self {
        match s {
            "payment_intent.succeeded" => Self::PaymentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentFailed,
            "customer.subscription.created" => Self::SubscriptionCreated,
            "customer.subscription.updated" => Self::SubscriptionUpdated,
            "customer.subscription.deleted" => Self::SubscriptionDeleted,
            other => Self::Unhandled(other.to_string()),
        }
    }

    /// Convert to the Stripe event type string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PaymentSucceeded => "payment_intent.succeeded",
            Self::PaymentFailed => "payment_intent.payment_failed",
            Self::SubscriptionCreated => "customer.subscription.created",
            Self::SubscriptionUpdated => "customer.subscription.updated",
            Self::SubscriptionDeleted => "customer.subscription.deleted",
            Self::Unhandled(s) => s,
        }
    }

    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Unhandled(_))
    }
}

/// A webhook event whose signature has been verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorEvent {
    /// Event id (`evt_...`).
    pub id: String,

    pub kind: EventKind,

    /// Unix timestamp the processor created the event.
    pub created: i64,

    /// Id of the object the event is about (payment intent, subscription).
    pub object_id: Option<String>,

    /// Customer owning the object, when present.
    pub customer_id: Option<String>,
}
