//! CreateSubscriptionHandler - Command handler for starting a paid subscription.

use std::sync::Arc;

use crate::domain::billing::{PlanCatalog, ProcessorStatus, SubscriptionError};
use crate::domain::foundation::{CallContext, UserId};
use crate::ports::{CreateCustomerRequest, CreateSubscriptionRequest, Customer, PaymentProcessor};

/// Command to subscribe the caller to a catalog plan.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub context: CallContext,
    pub plan_id: i32,
    /// Processor payment method token (`pm_...`).
    pub payment_method_id: String,
}

/// Result of a successful subscription creation.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription_id: String,
    pub customer_id: String,
    pub price_id: String,
    pub status: ProcessorStatus,
}

/// Handler for creating subscriptions.
///
/// Validates identity, plan and payment method before any processor call,
/// then runs customer resolution, attachment and creation in order.
/// Earlier steps are not rolled back when a later one fails.
pub struct CreateSubscriptionHandler {
    processor: Arc<dyn PaymentProcessor>,
    catalog: PlanCatalog,
}

impl CreateSubscriptionHandler {
    pub fn new(processor: Arc<dyn PaymentProcessor>, catalog: PlanCatalog) -> Self {
        Self { processor, catalog }
    }

    #[tracing::instrument(
        name = "create_subscription",
        skip(self, cmd),
        fields(
            operation = "CreateSubscription",
            request_id = %cmd.context.request_id(),
            plan_id = cmd.plan_id,
        )
    )]
    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, SubscriptionError> {
        // 1. Validate, first failure wins
        let user_id = cmd.context.caller_id().map_err(|e| {
            tracing::warn!(error = %e, "Rejecting request without a valid caller");
            SubscriptionError::from(e)
        })?;

        let price_id = self.catalog.price_for(cmd.plan_id).ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Plan is not in the catalog");
            SubscriptionError::InvalidPlan(cmd.plan_id)
        })?;

        if cmd.payment_method_id.is_empty() {
            tracing::warn!(user_id = %user_id, "Empty payment method token");
            return Err(SubscriptionError::invalid_payment_method(
                "payment method token is empty",
            ));
        }

        // 2. Resolve or create the processor customer
        let customer = self.resolve_customer(user_id).await?;

        // 3. Attach the payment method
        self.processor
            .attach_payment_method(&cmd.payment_method_id, &customer.id)
            .await
            .map_err(|e| {
                tracing::warn!(
                    user_id = %user_id,
                    customer_id = %customer.id,
                    error = %e,
                    "Failed to attach payment method"
                );
                SubscriptionError::invalid_payment_method(e.message)
            })?;

        // 4. Make it the invoice default; the subscription still proceeds on failure
        if let Err(e) = self
            .processor
            .set_default_payment_method(&customer.id, &cmd.payment_method_id)
            .await
        {
            tracing::warn!(
                user_id = %user_id,
                customer_id = %customer.id,
                error = %e,
                "Failed to set default payment method"
            );
        }

        // 5. Create the subscription
        let subscription = self
            .processor
            .create_subscription(CreateSubscriptionRequest {
                customer_id: customer.id.clone(),
                price_id: price_id.to_string(),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    user_id = %user_id,
                    customer_id = %customer.id,
                    error = %e,
                    "Failed to create subscription"
                );
                SubscriptionError::internal(e.to_string())
            })?;

        tracing::info!(
            user_id = %user_id,
            customer_id = %customer.id,
            subscription_id = %subscription.id,
            status = %subscription.status,
            "Subscription created"
        );

        Ok(CreateSubscriptionResult {
            subscription_id: subscription.id,
            customer_id: customer.id,
            price_id: price_id.to_string(),
            status: subscription.status,
        })
    }

    /// Look up the caller's customer, creating one when lookup fails or finds nothing.
    async fn resolve_customer(&self, user_id: UserId) -> Result<Customer, SubscriptionError> {
        match self.processor.find_customer(&user_id).await {
            Ok(Some(customer)) => {
                tracing::debug!(customer_id = %customer.id, "Reusing existing customer");
                return Ok(customer);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Customer lookup failed");
            }
        }

        let customer = self
            .processor
            .create_customer(CreateCustomerRequest::for_user(user_id))
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Failed to create customer");
                SubscriptionError::internal(e.to_string())
            })?;

        tracing::info!(user_id = %user_id, customer_id = %customer.id, "Customer created");
        Ok(customer)
    }
}
