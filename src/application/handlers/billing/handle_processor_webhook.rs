//! HandleProcessorWebhookHandler - Command handler for processor webhook deliveries.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::domain::billing::{EventKind, ProcessorEvent, WebhookError};
use crate::domain::foundation::CallContext;
use crate::ports::{PaymentErrorCode, PaymentProcessor};

/// Command to verify and dispatch a webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleProcessorWebhookCommand {
    pub context: CallContext,
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
    /// Endpoint signing secret (`whsec_...`).
    pub secret: SecretString,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleProcessorWebhookResult {
    /// Event type is one the dispatcher recognizes.
    Handled { event_id: String, kind: EventKind },
    /// Event acknowledged but its type is not dispatched.
    Ignored { event_id: String, event_type: String },
}

/// Handler for processor webhooks.
///
/// Verification happens before anything else. Dispatch only records the
/// event in the logs; no local state changes.
pub struct HandleProcessorWebhookHandler {
    processor: Arc<dyn PaymentProcessor>,
}

impl HandleProcessorWebhookHandler {
    pub fn new(processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { processor }
    }

    #[tracing::instrument(
        name = "handle_processor_webhook",
        skip(self, cmd),
        fields(
            operation = "HandleProcessorWebhook",
            request_id = %cmd.context.request_id(),
            payload_len = cmd.payload.len(),
        )
    )]
    pub async fn handle(
        &self,
        cmd: HandleProcessorWebhookCommand,
    ) -> Result<HandleProcessorWebhookResult, WebhookError> {
        if cmd.signature.trim().is_empty() {
            tracing::warn!("Webhook delivered without a signature");
            return Err(WebhookError::MissingSignature);
        }

        // 1. Verify signature and parse event
        let event = self
            .processor
            .construct_event(&cmd.payload, &cmd.signature, cmd.secret.expose_secret())
            .map_err(|e| {
                tracing::warn!(error = %e, "Webhook verification failed");
                match e.code {
                    PaymentErrorCode::InvalidWebhook => WebhookError::InvalidSignature(e.message),
                    _ => WebhookError::Processing(e.message),
                }
            })?;

        // 2. Dispatch by type
        Ok(dispatch(event))
    }
}

fn dispatch(event: ProcessorEvent) -> HandleProcessorWebhookResult {
    let object_id = event.object_id.as_deref().unwrap_or_default();
    let customer_id = event.customer_id.as_deref().unwrap_or_default();

    match &event.kind {
        EventKind::PaymentSucceeded => {
            tracing::info!(
                event_id = %event.id,
                payment_intent_id = object_id,
                customer_id,
                "Payment succeeded"
            );
        }
        EventKind::PaymentFailed => {
            tracing::warn!(
                event_id = %event.id,
                payment_intent_id = object_id,
                customer_id,
                "Payment failed"
            );
        }
        EventKind::SubscriptionCreated
        | EventKind::SubscriptionUpdated
        | EventKind::SubscriptionDeleted => {
            tracing::info!(
                event_id = %event.id,
                event_type = event.kind.as_str(),
                subscription_id = object_id,
                customer_id,
                "Subscription event received"
            );
        }
        EventKind::Unhandled(event_type) => {
            tracing::info!(
                event_id = %event.id,
                event_type = %event_type,
                "Received unhandled Stripe event"
            );
            return HandleProcessorWebhookResult::Ignored {
                event_type: event_type.clone(),
                event_id: event.id,
            };
        }
    }

    HandleProcessorWebhookResult::Handled {
        event_id: event.id,
        kind: event.kind,
    }
}
