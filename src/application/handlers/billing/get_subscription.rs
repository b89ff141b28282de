//! GetSubscriptionHandler - Query handler for a subscription snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::billing::{estimated_period_end, LifecycleStatus, PlanCatalog, SubscriptionRecord};
use crate::domain::foundation::CallContext;
use crate::ports::PaymentProcessor;

/// Query for one subscription by processor id.
#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub context: CallContext,
    pub subscription_id: String,
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Handler for reading subscriptions.
///
/// Never fails: anything that prevents building a record yields
/// [`SubscriptionRecord::empty`].
pub struct GetSubscriptionHandler {
    processor: Arc<dyn PaymentProcessor>,
    catalog: PlanCatalog,
    clock: Clock,
}

impl GetSubscriptionHandler {
    pub fn new(processor: Arc<dyn PaymentProcessor>, catalog: PlanCatalog) -> Self {
        Self {
            processor,
            catalog,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock used for estimated period ends.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[tracing::instrument(
        name = "get_subscription",
        skip(self, query),
        fields(
            operation = "GetSubscription",
            request_id = %query.context.request_id(),
            subscription_id = %query.subscription_id,
        )
    )]
    pub async fn handle(&self, query: GetSubscriptionQuery) -> SubscriptionRecord {
        if query.subscription_id.is_empty() {
            tracing::warn!("Lookup requested without a subscription id");
            return SubscriptionRecord::empty();
        }

        let subscription = match self.processor.get_subscription(&query.subscription_id).await {
            Ok(Some(subscription)) => subscription,
            Ok(None) => {
                tracing::warn!("Subscription not found");
                return SubscriptionRecord::empty();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch subscription");
                return SubscriptionRecord::empty();
            }
        };

        let Some(price_id) = subscription.primary_price() else {
            tracing::warn!("Subscription has no items");
            return SubscriptionRecord::empty();
        };

        let (current_period_end, period_end_estimated) = match subscription.reported_period_end() {
            Some(end) => (end, false),
            None => (estimated_period_end((self.clock)()), true),
        };

        let status = LifecycleStatus::from(&subscription.status);
        tracing::debug!(
            processor_status = %subscription.status,
            status = %status,
            period_end_estimated,
            "Subscription read"
        );

        SubscriptionRecord {
            subscription_id: subscription.id.clone(),
            price_id: price_id.to_string(),
            plan_id: self.catalog.plan_for_price(price_id).map(|plan| plan.id),
            status,
            current_period_end,
            period_end_estimated,
        }
    }
}
