//! HTTP DTOs (Data Transfer Objects) for the payment service RPC endpoints.
//!
//! These types define the JSON request/response structure for the
//! `payment.PaymentService` methods. Request fields default to empty so that
//! missing values reach the orchestrator and produce its outcomes.

use serde::{Deserialize, Serialize};

use crate::application::{ConfirmPaymentIntentResult, CreateSubscriptionResult};
use crate::domain::billing::SubscriptionRecord;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to subscribe the caller to a plan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSubscriptionRequest {
    /// Internal plan id from the catalog.
    #[serde(default)]
    pub plan_id: i32,
    /// Processor payment method token (`pm_...`).
    #[serde(default)]
    pub payment_method_id: String,
}

/// Request naming a subscription (cancel and get).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionIdRequest {
    #[serde(default)]
    pub subscription_id: String,
}

/// Request to confirm a payment intent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmPaymentIntentRequest {
    #[serde(default)]
    pub payment_intent_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for a created subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionResponse {
    pub subscription_id: String,
}

impl From<CreateSubscriptionResult> for CreateSubscriptionResponse {
    fn from(result: CreateSubscriptionResult) -> Self {
        Self {
            subscription_id: result.subscription_id,
        }
    }
}

/// Response for a cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelSubscriptionResponse {
    pub subscription_id: String,
}

/// Subscription snapshot for API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    /// Processor subscription id, passed through unchanged.
    pub subscription_id: String,
    /// Catalog plan id, 0 when the price is not in the catalog.
    pub plan_id: i32,
    pub price_id: String,
    /// Lifecycle status (`ACTIVE`, `CANCELED`, ..., `UNSPECIFIED`).
    pub status: String,
    /// End of the current billing period (Unix seconds).
    pub current_period_end: i64,
    /// True when the period end was estimated rather than reported.
    pub period_end_estimated: bool,
}

impl From<SubscriptionRecord> for SubscriptionResponse {
    fn from(record: SubscriptionRecord) -> Self {
        Self {
            subscription_id: record.subscription_id,
            plan_id: record.plan_id.unwrap_or(0),
            price_id: record.price_id,
            status: record.status.as_str().to_string(),
            current_period_end: record.current_period_end,
            period_end_estimated: record.period_end_estimated,
        }
    }
}

/// Response for a payment intent confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentIntentResponse {
    pub payment_intent_id: String,
    pub status: String,
    pub confirmed: bool,
}

impl From<ConfirmPaymentIntentResult> for ConfirmPaymentIntentResponse {
    fn from(result: ConfirmPaymentIntentResult) -> Self {
        Self {
            status: result.status.as_str().to_string(),
            payment_intent_id: result.payment_intent_id,
            confirmed: result.confirmed,
        }
    }
}

/// Acknowledgement returned to the processor for a webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub received: bool,
    /// False when the event type is not dispatched.
    pub handled: bool,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::LifecycleStatus;

    // ════════════════════════════════════════════════════════════════════════════
    // Request Deserialization Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn create_request_deserializes() {
        let json = r#"{"plan_id": 1, "payment_method_id": "pm_test"}"#;
        let request: CreateSubscriptionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.plan_id, 1);
        assert_eq!(request.payment_method_id, "pm_test");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let request: CreateSubscriptionRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.plan_id, 0);
        assert!(request.payment_method_id.is_empty());

        let request: SubscriptionIdRequest = serde_json::from_str("{}").unwrap();
        assert!(request.subscription_id.is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Response Serialization Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn subscription_response_keeps_ids_as_strings() {
        let record = SubscriptionRecord {
            subscription_id: "sub_1MowQVLkdIwHu7ixeRlqHVzs".to_string(),
            price_id: "price_basic_123".to_string(),
            plan_id: Some(1),
            status: LifecycleStatus::Active,
            current_period_end: 1_706_745_600,
            period_end_estimated: false,
        };

        let json = serde_json::to_value(SubscriptionResponse::from(record)).unwrap();

        assert_eq!(json["subscription_id"], "sub_1MowQVLkdIwHu7ixeRlqHVzs");
        assert_eq!(json["plan_id"], 1);
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["current_period_end"], 1_706_745_600);
    }

    #[test]
    fn unknown_price_reports_plan_zero() {
        let record = SubscriptionRecord {
            subscription_id: "sub_1".to_string(),
            price_id: "price_legacy".to_string(),
            ..SubscriptionRecord::empty()
        };
        assert_eq!(SubscriptionResponse::from(record).plan_id, 0);
    }

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_string(&ErrorResponse::new("INTERNAL", "internal error!")).unwrap();
        assert!(json.contains("\"error_code\":\"INTERNAL\""));
        assert!(!json.contains("details"));
    }
}
