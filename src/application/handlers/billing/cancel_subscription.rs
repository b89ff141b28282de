//! CancelSubscriptionHandler - Command handler for immediate cancellation.

use std::sync::Arc;

use crate::domain::billing::SubscriptionError;
use crate::domain::foundation::CallContext;
use crate::ports::PaymentProcessor;

/// Command to cancel a processor subscription.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub context: CallContext,
    pub subscription_id: String,
}

/// Result of a cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelSubscriptionResult {
    pub subscription_id: String,
    /// False when the subscription was already canceled and no request was sent.
    pub cancel_issued: bool,
}

/// Handler for cancelling subscriptions.
///
/// Cancelling an already-canceled subscription succeeds without contacting
/// the processor a second time.
pub struct CancelSubscriptionHandler {
    processor: Arc<dyn PaymentProcessor>,
}

impl CancelSubscriptionHandler {
    pub fn new(processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { processor }
    }

    #[tracing::instrument(
        name = "cancel_subscription",
        skip(self, cmd),
        fields(
            operation = "CancelSubscription",
            request_id = %cmd.context.request_id(),
            subscription_id = %cmd.subscription_id,
        )
    )]
    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, SubscriptionError> {
        if cmd.subscription_id.is_empty() {
            tracing::warn!("Cancel requested without a subscription id");
            return Err(SubscriptionError::internal("subscription id is empty"));
        }

        // 1. Fetch current state
        let subscription = self
            .processor
            .get_subscription(&cmd.subscription_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch subscription");
                SubscriptionError::internal(e.to_string())
            })?
            .ok_or_else(|| {
                tracing::warn!("Subscription not found");
                SubscriptionError::internal("subscription not found")
            })?;

        // 2. Idempotent: nothing to do
        if subscription.status.is_canceled() {
            tracing::info!("Subscription already canceled");
            return Ok(CancelSubscriptionResult {
                subscription_id: subscription.id,
                cancel_issued: false,
            });
        }

        // 3. Cancel and confirm the processor applied it
        let canceled = self
            .processor
            .cancel_subscription(&cmd.subscription_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to cancel subscription");
                SubscriptionError::internal(e.to_string())
            })?;

        if !canceled.status.is_canceled() {
            tracing::error!(
                status = %canceled.status,
                "Cancel accepted but subscription is not canceled"
            );
            return Err(SubscriptionError::internal(format!(
                "subscription status after cancel is {}",
                canceled.status
            )));
        }

        tracing::info!("Subscription canceled");
        Ok(CancelSubscriptionResult {
            subscription_id: canceled.id,
            cancel_issued: true,
        })
    }
}
