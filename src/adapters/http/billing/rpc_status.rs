//! RPC status codes for orchestrator outcomes.
//!
//! | Outcome                | RPC code         | HTTP |
//! |------------------------|------------------|------|
//! | OK                     | OK               | 200  |
//! | INVALID_USER           | INVALID_ARGUMENT | 400  |
//! | INVALID_PLAN           | INVALID_ARGUMENT | 400  |
//! | INVALID_PAYMENT_METHOD | INVALID_ARGUMENT | 400  |
//! | INTERNAL_ERROR         | INTERNAL         | 500  |

use axum::http::StatusCode;

use crate::domain::billing::Outcome;

/// Status code reported on the RPC surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCode {
    Ok,
    InvalidArgument,
    Internal,
}

impl RpcCode {
    pub fn from_outcome(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Ok => RpcCode::Ok,
            Outcome::InvalidUser | Outcome::InvalidPlan | Outcome::InvalidPaymentMethod => {
                RpcCode::InvalidArgument
            }
            Outcome::InternalError => RpcCode::Internal,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            RpcCode::Ok => StatusCode::OK,
            RpcCode::InvalidArgument => StatusCode::BAD_REQUEST,
            RpcCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RpcCode::Ok => "OK",
            RpcCode::InvalidArgument => "INVALID_ARGUMENT",
            RpcCode::Internal => "INTERNAL",
        }
    }
}

/// Client-facing message for a failed outcome.
pub fn outcome_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Ok => "ok",
        Outcome::InvalidUser => "Invalid user",
        Outcome::InvalidPlan => "invalid plan",
        Outcome::InvalidPaymentMethod => "invalid paying method",
        Outcome::InternalError => "internal error!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_are_invalid_argument() {
        for outcome in [
            Outcome::InvalidUser,
            Outcome::InvalidPlan,
            Outcome::InvalidPaymentMethod,
        ] {
            let code = RpcCode::from_outcome(outcome);
            assert_eq!(code, RpcCode::InvalidArgument);
            assert_eq!(code.http_status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn internal_error_is_internal() {
        let code = RpcCode::from_outcome(Outcome::InternalError);
        assert_eq!(code.as_str(), "INTERNAL");
        assert_eq!(code.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn ok_is_200() {
        assert_eq!(RpcCode::from_outcome(Outcome::Ok).http_status(), StatusCode::OK);
    }

    #[test]
    fn messages_match_client_contract() {
        assert_eq!(outcome_message(Outcome::InvalidUser), "Invalid user");
        assert_eq!(outcome_message(Outcome::InvalidPlan), "invalid plan");
        assert_eq!(
            outcome_message(Outcome::InvalidPaymentMethod),
            "invalid paying method"
        );
        assert_eq!(outcome_message(Outcome::InternalError), "internal error!");
    }
}
