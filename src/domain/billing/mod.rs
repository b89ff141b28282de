//! Billing domain - subscription lifecycle vocabulary.
//!
//! Contains the plan catalog, status mapping, the outcome taxonomy and the
//! error types shared by the lifecycle handlers.

mod errors;
mod event;
mod outcome;
mod plan;
mod status;
mod subscription;

pub use errors::{SubscriptionError, WebhookError};
pub use event::{EventKind, ProcessorEvent};
pub use outcome::Outcome;
pub use plan::{Plan, PlanCatalog};
pub use status::{LifecycleStatus, ProcessorStatus};
pub use subscription::{estimated_period_end, SubscriptionRecord};
