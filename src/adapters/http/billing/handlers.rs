//! HTTP handlers for payment service endpoints.
//!
//! These handlers connect Axum routes to the billing command/query handlers
//! and translate outcomes into RPC status codes.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use secrecy::SecretString;

use crate::application::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, ConfirmPaymentIntentCommand,
    ConfirmPaymentIntentHandler, CreateSubscriptionCommand, CreateSubscriptionHandler,
    GetSubscriptionHandler, GetSubscriptionQuery, HandleProcessorWebhookCommand,
    HandleProcessorWebhookHandler, HandleProcessorWebhookResult,
};
use crate::domain::billing::{Outcome, PlanCatalog, SubscriptionError, WebhookError};
use crate::ports::PaymentProcessor;

use super::super::middleware::RequestContext;
use super::dto::{
    CancelSubscriptionResponse, ConfirmPaymentIntentRequest, ConfirmPaymentIntentResponse,
    CreateSubscriptionRequest, CreateSubscriptionResponse, ErrorResponse, SubscriptionIdRequest,
    SubscriptionResponse, WebhookAckResponse,
};
use super::rpc_status::{outcome_message, RpcCode};

/// Header carrying the processor's webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request. Nothing in it is mutated after startup.
#[derive(Clone)]
pub struct BillingAppState {
    pub processor: Arc<dyn PaymentProcessor>,
    pub catalog: PlanCatalog,
    pub webhook_secret: SecretString,
    /// Configured token lifetime. Carried for callers; processor calls are not bounded by it.
    pub token_ttl: Duration,
}

impl BillingAppState {
    pub fn new(processor: Arc<dyn PaymentProcessor>, webhook_secret: SecretString) -> Self {
        Self {
            processor,
            catalog: PlanCatalog::standard(),
            webhook_secret,
            token_ttl: Duration::from_secs(3600),
        }
    }

    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Create handlers on demand from the shared state.
    pub fn create_subscription_handler(&self) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(self.processor.clone(), self.catalog)
    }

    pub fn cancel_subscription_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.processor.clone())
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.processor.clone(), self.catalog)
    }

    pub fn confirm_payment_intent_handler(&self) -> ConfirmPaymentIntentHandler {
        ConfirmPaymentIntentHandler::new(self.processor.clone())
    }

    pub fn webhook_handler(&self) -> HandleProcessorWebhookHandler {
        HandleProcessorWebhookHandler::new(self.processor.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// RPC Handlers (POST /payment.PaymentService/<Method>)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /payment.PaymentService/CreateSubscription
pub async fn create_subscription(
    State(state): State<BillingAppState>,
    RequestContext(context): RequestContext,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let request = decode(payload)?;
    let handler = state.create_subscription_handler();
    let cmd = CreateSubscriptionCommand {
        context,
        plan_id: request.plan_id,
        payment_method_id: request.payment_method_id,
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(CreateSubscriptionResponse::from(result)))
}

/// POST /payment.PaymentService/CancelSubscription
pub async fn cancel_subscription(
    State(state): State<BillingAppState>,
    RequestContext(context): RequestContext,
    payload: Result<Json<SubscriptionIdRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let request = decode(payload)?;
    let handler = state.cancel_subscription_handler();
    let cmd = CancelSubscriptionCommand {
        context,
        subscription_id: request.subscription_id,
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(CancelSubscriptionResponse {
        subscription_id: result.subscription_id,
    }))
}

/// POST /payment.PaymentService/GetSubscription
///
/// An empty record means the subscription could not be read.
pub async fn get_subscription(
    State(state): State<BillingAppState>,
    RequestContext(context): RequestContext,
    payload: Result<Json<SubscriptionIdRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let request = decode(payload)?;
    let handler = state.get_subscription_handler();
    let query = GetSubscriptionQuery {
        context,
        subscription_id: request.subscription_id,
    };

    let record = handler.handle(query).await;
    if record.is_empty() {
        return Err(BillingApiError(Outcome::InternalError));
    }

    Ok(Json(SubscriptionResponse::from(record)))
}

/// POST /payment.PaymentService/ConfirmPaymentIntent
pub async fn confirm_payment_intent(
    State(state): State<BillingAppState>,
    RequestContext(context): RequestContext,
    payload: Result<Json<ConfirmPaymentIntentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, BillingApiError> {
    let request = decode(payload)?;
    let handler = state.confirm_payment_intent_handler();
    let cmd = ConfirmPaymentIntentCommand {
        context,
        payment_intent_id: request.payment_intent_id,
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(ConfirmPaymentIntentResponse::from(result)))
}

/// Unwrap an RPC body. Undecodable bodies become `INTERNAL` like any other
/// failed call instead of axum's plain-text rejection.
fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, BillingApiError> {
    payload.map(|Json(request)| request).map_err(|rejection| {
        tracing::warn!(
            status = rejection.status().as_u16(),
            error = %rejection.body_text(),
            "Rejected undecodable RPC body"
        );
        BillingApiError(Outcome::InternalError)
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handler
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/stripe - Handle Stripe webhook events
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    RequestContext(context): RequestContext,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let handler = state.webhook_handler();
    let cmd = HandleProcessorWebhookCommand {
        context,
        payload: body.to_vec(),
        signature: signature.to_string(),
        secret: state.webhook_secret.clone(),
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(WebhookAckResponse {
        received: true,
        handled: matches!(result, HandleProcessorWebhookResult::Handled { .. }),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error carrying the failed outcome of an RPC.
#[derive(Debug)]
pub struct BillingApiError(pub Outcome);

impl From<SubscriptionError> for BillingApiError {
    fn from(err: SubscriptionError) -> Self {
        Self(err.outcome())
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let code = RpcCode::from_outcome(self.0);
        let body = ErrorResponse::new(code.as_str(), outcome_message(self.0));
        (code.http_status(), Json(body)).into_response()
    }
}

/// API error type for webhook ingestion.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let error_code = match &self.0 {
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::InvalidSignature(_) => "INVALID_WEBHOOK_SIGNATURE",
            WebhookError::Processing(_) => "WEBHOOK_PROCESSING_FAILED",
        };
        let body = ErrorResponse::new(error_code, self.0.to_string());
        (self.0.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockPaymentProcessor;
    use crate::domain::foundation::IdentityError;
    use axum::http::StatusCode;

    fn test_state(mock: &MockPaymentProcessor) -> BillingAppState {
        BillingAppState::new(
            Arc::new(mock.clone()),
            SecretString::new("whsec_test".to_string()),
        )
    }

    async fn error_body(response: axum::response::Response) -> ErrorResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalid_user_maps_to_400_invalid_argument() {
        let err = BillingApiError::from(SubscriptionError::InvalidUser(IdentityError::Missing));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body.error_code, "INVALID_ARGUMENT");
        assert_eq!(body.message, "Invalid user");
    }

    #[tokio::test]
    async fn internal_maps_to_500() {
        let err = BillingApiError::from(SubscriptionError::internal("boom"));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = error_body(response).await;
        assert_eq!(body.error_code, "INTERNAL");
        assert_eq!(body.message, "internal error!");
    }

    #[tokio::test]
    async fn invalid_webhook_signature_maps_to_401() {
        let response =
            WebhookApiError::from(WebhookError::InvalidSignature("bad".into())).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(response).await.error_code, "INVALID_WEBHOOK_SIGNATURE");
    }

    #[tokio::test]
    async fn missing_webhook_signature_maps_to_400() {
        let response = WebhookApiError::from(WebhookError::MissingSignature).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // State Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn state_defaults_to_standard_catalog_and_one_hour_ttl() {
        let state = test_state(&MockPaymentProcessor::new());
        assert_eq!(state.catalog.price_for(1), Some("price_basic_123"));
        assert_eq!(state.token_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn with_token_ttl_overrides_lifetime() {
        let state =
            test_state(&MockPaymentProcessor::new()).with_token_ttl(Duration::from_secs(60));
        assert_eq!(state.token_ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn get_subscription_reports_empty_record_as_internal() {
        let mock = MockPaymentProcessor::new();
        let result = get_subscription(
            State(test_state(&mock)),
            RequestContext(Default::default()),
            Ok(Json(SubscriptionIdRequest {
                subscription_id: "sub_missing".to_string(),
            })),
        )
        .await;

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
