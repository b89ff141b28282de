//! Subscription record returned to callers.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use super::status::LifecycleStatus;

/// Snapshot of a processor subscription, built fresh for each response.
///
/// The all-empty value is the "unavailable" sentinel. Nothing here is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Processor-assigned subscription id (`sub_...`).
    pub subscription_id: String,

    /// Processor price billed by the first subscription item.
    pub price_id: String,

    /// Internal plan id when the price is in the catalog.
    pub plan_id: Option<i32>,

    pub status: LifecycleStatus,

    /// End of the current billing period (Unix seconds).
    pub current_period_end: i64,

    /// True when `current_period_end` was estimated rather than reported.
    pub period_end_estimated: bool,
}

impl SubscriptionRecord {
    /// The sentinel returned when a subscription cannot be read.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

/// Period end used when the processor omits one: one calendar month from `now`.
pub fn estimated_period_end(now: DateTime<Utc>) -> i64 {
    now.checked_add_months(Months::new(1))
        .unwrap_or(now)
        .timestamp()
}
