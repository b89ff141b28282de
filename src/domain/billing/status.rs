//! Subscription status types.
//!
//! [`ProcessorStatus`] mirrors the status strings Stripe reports.
//! [`LifecycleStatus`] is the status this service exposes. The conversion
//! between them is total: anything without a lifecycle counterpart becomes
//! [`LifecycleStatus::Unspecified`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription status as reported by the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorStatus {
    Active,
    PastDue,
    Canceled,
    Incomplete,
    IncompleteExpired,
    Trialing,
    Unpaid,
    Paused,
    /// Any status string this service does not know.
    Unknown(String),
}

impl ProcessorStatus {
    /// Parses a processor status string. Never fails.
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "past_due" => Self::PastDue,
            "canceled" => Self::Canceled,
            "incomplete" => Self::Incomplete,
            "incomplete_expired" => Self::IncompleteExpired,
            "trialing" => Self::Trialing,
            "unpaid" => Self::Unpaid,
            "paused" => Self::Paused,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Trialing => "trialing",
            Self::Unpaid => "unpaid",
            Self::Paused => "paused",
            Self::Unknown(s) => s,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

impl fmt::Display for ProcessorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription lifecycle status exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStatus {
    Active,
    Canceled,
    IncompleteExpired,
    Unpaid,
    Trialing,
    #[default]
    Unspecified,
}

impl LifecycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Canceled => "CANCELED",
            Self::IncompleteExpired => "INCOMPLETE_EXPIRED",
            Self::Unpaid => "UNPAID",
            Self::Trialing => "TRIALING",
            Self::Unspecified => "UNSPECIFIED",
        }
    }
}

impl From<&ProcessorStatus> for LifecycleStatus {
    fn from(status: &ProcessorStatus) -> Self {
        match status {
            ProcessorStatus::Active => Self::Active,
            ProcessorStatus::Canceled => Self::Canceled,
            ProcessorStatus::IncompleteExpired => Self::IncompleteExpired,
            ProcessorStatus::Unpaid => Self::Unpaid,
            ProcessorStatus::Trialing => Self::Trialing,
            _ => Self::Unspecified,
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
