//! Operation outcome taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::SubscriptionError;

/// Result classification of every lifecycle operation.
///
/// The transport layer decides its status code from this value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Ok,
    InvalidUser,
    InvalidPlan,
    InvalidPaymentMethod,
    InternalError,
}

impl Outcome {
    /// Classifies a handler result.
    pub fn of<T>(result: &Result<T, SubscriptionError>) -> Self {
        match result {
            Ok(_) => Outcome::Ok,
            Err(err) => err.outcome(),
        }
    }

    /// Returns true for rejections caused by caller input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Outcome::InvalidUser | Outcome::InvalidPlan | Outcome::InvalidPaymentMethod
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::InvalidUser => "INVALID_USER",
            Outcome::InvalidPlan => "INVALID_PLAN",
            Outcome::InvalidPaymentMethod => "INVALID_PAYMENT_METHOD",
            Outcome::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
