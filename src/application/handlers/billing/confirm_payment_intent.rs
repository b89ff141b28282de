//! ConfirmPaymentIntentHandler - Command handler for confirming a pending payment.

use std::sync::Arc;

use crate::domain::billing::SubscriptionError;
use crate::domain::foundation::CallContext;
use crate::ports::{PaymentIntentStatus, PaymentProcessor};

/// Command to confirm a subscription's first payment.
#[derive(Debug, Clone)]
pub struct ConfirmPaymentIntentCommand {
    pub context: CallContext,
    pub payment_intent_id: String,
}

/// Result of a confirmation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPaymentIntentResult {
    pub payment_intent_id: String,
    pub status: PaymentIntentStatus,
    /// True when a confirm request was sent to the processor.
    pub confirmed: bool,
}

/// Handler for confirming payment intents.
///
/// Intents in any state other than `requires_confirmation` are left alone.
pub struct ConfirmPaymentIntentHandler {
    processor: Arc<dyn PaymentProcessor>,
}

impl ConfirmPaymentIntentHandler {
    pub fn new(processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { processor }
    }

    #[tracing::instrument(
        name = "confirm_payment_intent",
        skip(self, cmd),
        fields(
            operation = "ConfirmPaymentIntent",
            request_id = %cmd.context.request_id(),
            payment_intent_id = %cmd.payment_intent_id,
        )
    )]
    pub async fn handle(
        &self,
        cmd: ConfirmPaymentIntentCommand,
    ) -> Result<ConfirmPaymentIntentResult, SubscriptionError> {
        if cmd.payment_intent_id.is_empty() {
            tracing::warn!("Confirm requested without a payment intent id");
            return Err(SubscriptionError::internal("payment intent id is empty"));
        }

        let intent = self
            .processor
            .get_payment_intent(&cmd.payment_intent_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch payment intent");
                SubscriptionError::internal(e.to_string())
            })?
            .ok_or_else(|| {
                tracing::warn!("Payment intent not found");
                SubscriptionError::internal("payment intent not found")
            })?;

        if intent.status != PaymentIntentStatus::RequiresConfirmation {
            tracing::info!(status = intent.status.as_str(), "Payment intent needs no confirmation");
            return Ok(ConfirmPaymentIntentResult {
                payment_intent_id: intent.id,
                status: intent.status,
                confirmed: false,
            });
        }

        let confirmed = self
            .processor
            .confirm_payment_intent(&cmd.payment_intent_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to confirm payment intent");
                SubscriptionError::internal(e.to_string())
            })?;

        tracing::info!(status = confirmed.status.as_str(), "Payment intent confirmed");
        Ok(ConfirmPaymentIntentResult {
            payment_intent_id: confirmed.id,
            status: confirmed.status,
            confirmed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProcessor;
    use crate::domain::billing::Outcome;
    use crate::ports::{PaymentError, PaymentIntent};

    fn command(id: &str) -> ConfirmPaymentIntentCommand {
        ConfirmPaymentIntentCommand {
            context: CallContext::default(),
            payment_intent_id: id.to_string(),
        }
    }

    fn intent(id: &str, status: PaymentIntentStatus) -> PaymentIntent {
        PaymentIntent {
            id: id.to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn empty_id_is_internal_without_processor_calls() {
        let mock = MockPaymentProcessor::new();
        let handler = ConfirmPaymentIntentHandler::new(Arc::new(mock.clone()));

        let result = handler.handle(command("")).await;

        assert_eq!(Outcome::of(&result), Outcome::InternalError);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn intent_requiring_confirmation_is_confirmed() {
        let mock = MockPaymentProcessor::new();
        mock.add_payment_intent(intent("pi_1", PaymentIntentStatus::RequiresConfirmation));
        let handler = ConfirmPaymentIntentHandler::new(Arc::new(mock.clone()));

        let result = handler.handle(command("pi_1")).await.unwrap();

        assert!(result.confirmed);
        assert_eq!(result.status, PaymentIntentStatus::Succeeded);
        assert_eq!(mock.call_count("confirm_payment_intent"), 1);
    }

    #[tokio::test]
    async fn intent_in_other_state_is_left_alone() {
        let mock = MockPaymentProcessor::new();
        mock.add_payment_intent(intent("pi_1", PaymentIntentStatus::Succeeded));
        let handler = ConfirmPaymentIntentHandler::new(Arc::new(mock.clone()));

        let result = handler.handle(command("pi_1")).await.unwrap();

        assert!(!result.confirmed);
        assert!(!mock.was_called("confirm_payment_intent"));
    }

    #[tokio::test]
    async fn unknown_intent_is_internal() {
        let mock = MockPaymentProcessor::new();
        let handler = ConfirmPaymentIntentHandler::new(Arc::new(mock));

        let result = handler.handle(command("pi_missing")).await;

        assert_eq!(Outcome::of(&result), Outcome::InternalError);
    }

    #[tokio::test]
    async fn confirm_failure_is_internal() {
        let mock = MockPaymentProcessor::new();
        mock.add_payment_intent(intent("pi_1", PaymentIntentStatus::RequiresConfirmation));
        mock.set_method_error(
            "confirm_payment_intent",
            PaymentError::provider("card declined"),
        );
        let handler = ConfirmPaymentIntentHandler::new(Arc::new(mock));

        let result = handler.handle(command("pi_1")).await;

        assert_eq!(Outcome::of(&result), Outcome::InternalError);
    }
}
