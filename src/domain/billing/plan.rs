//! Plan catalog.
//!
//! Internal plan identifiers are small integers. Each maps to exactly one
//! Stripe price. The table is fixed at build time.

/// A plan and the Stripe price that bills it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub id: i32,
    pub price_id: &'static str,
}

const STANDARD_PLANS: &[Plan] = &[
    Plan {
        id: 1,
        price_id: "price_basic_123",
    },
    Plan {
        id: 2,
        price_id: "price_pro_456",
    },
];

/// Static lookup from plan identifiers to processor prices.
#[derive(Debug, Clone, Copy)]
pub struct PlanCatalog {
    plans: &'static [Plan],
}

impl PlanCatalog {
    /// The catalog this service bills against.
    pub fn standard() -> Self {
        Self {
            plans: STANDARD_PLANS,
        }
    }

    /// Finds the plan for an internal identifier.
    pub fn resolve(&self, plan_id: i32) -> Option<&'static Plan> {
        self.plans
            .iter()
            .find(|p| p.id == plan_id && !p.price_id.is_empty())
    }

    /// Returns the price for a plan, if the plan exists.
    pub fn price_for(&self, plan_id: i32) -> Option<&'static str> {
        self.resolve(plan_id).map(|p| p.price_id)
    }

    /// Reverse lookup used when rendering subscriptions.
    pub fn plan_for_price(&self, price_id: &str) -> Option<&'static Plan> {
        self.plans.iter().find(|p| p.price_id == price_id)
    }

    pub fn plans(&self) -> &'static [Plan] {
        self.plans
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
