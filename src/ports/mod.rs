//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Billing Ports
//!
//! - `PaymentProcessor` - Customer, subscription, payment intent and webhook
//!   operations against the external billing processor

mod payment_processor;

pub use payment_processor::{
    CreateCustomerRequest, CreateSubscriptionRequest, Customer, PaymentError, PaymentErrorCode,
    PaymentIntent, PaymentIntentStatus, PaymentMethod, PaymentProcessor, Subscription,
    SubscriptionItem,
};
