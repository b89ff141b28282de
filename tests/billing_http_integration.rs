//! Integration tests for the payment service HTTP surface.
//!
//! Drives the full router (billing routes, health, tower-http layers) against
//! the in-memory processor mock.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use payment_service::adapters::http::middleware::USER_ID_HEADER;
use payment_service::adapters::http::billing::STRIPE_SIGNATURE_HEADER;
use payment_service::adapters::http::BillingAppState;
use payment_service::adapters::stripe::MockPaymentProcessor;
use payment_service::app::build_router;

// ════════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════════

fn app(mock: &MockPaymentProcessor) -> Router {
    let state = BillingAppState::new(
        Arc::new(mock.clone()),
        SecretString::new("whsec_integration".to_string()),
    );
    build_router(state, Duration::from_secs(5))
}

fn rpc(method: &str, user_id: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/payment.PaymentService/{}", method))
        .header("content-type", "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header(USER_ID_HEADER, user_id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn subscribe(app: &Router, user_id: &str) -> String {
    let (status, body) = send(
        app,
        rpc(
            "CreateSubscription",
            Some(user_id),
            json!({"plan_id": 1, "payment_method_id": "pm_test"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    body["subscription_id"].as_str().unwrap().to_string()
}

// ════════════════════════════════════════════════════════════════════════════════
// CreateSubscription
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn create_subscription_returns_processor_id() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let subscription_id = subscribe(&app, "42").await;

    assert!(subscription_id.starts_with("sub_"));
    assert_eq!(mock.call_count("create_customer"), 1);
    assert_eq!(mock.call_count("attach_payment_method"), 1);
    assert_eq!(mock.call_count("create_subscription"), 1);
}

#[tokio::test]
async fn second_subscription_reuses_customer() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    subscribe(&app, "42").await;
    subscribe(&app, "42").await;

    assert_eq!(mock.call_count("create_customer"), 1);
    assert_eq!(mock.call_count("create_subscription"), 2);
}

#[tokio::test]
async fn unknown_plan_is_rejected_before_processor_calls() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let (status, body) = send(
        &app,
        rpc(
            "CreateSubscription",
            Some("42"),
            json!({"plan_id": 99, "payment_method_id": "pm_test"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_ARGUMENT");
    assert_eq!(body["message"], "invalid plan");
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn missing_identity_is_invalid_user() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let (status, body) = send(
        &app,
        rpc(
            "CreateSubscription",
            None,
            json!({"plan_id": 1, "payment_method_id": "pm_test"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid user");
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn malformed_identity_is_invalid_user() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let (status, body) = send(
        &app,
        rpc(
            "CreateSubscription",
            Some("not-a-number"),
            json!({"plan_id": 1, "payment_method_id": "pm_test"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid user");
}

#[tokio::test]
async fn empty_payment_token_is_invalid_paying_method() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let (status, body) = send(
        &app,
        rpc("CreateSubscription", Some("42"), json!({"plan_id": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid paying method");
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn undecodable_body_is_internal_with_rpc_error_body() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let request = Request::builder()
        .method("POST")
        .uri("/payment.PaymentService/CreateSubscription")
        .header("content-type", "text/plain")
        .header(USER_ID_HEADER, "42")
        .body(Body::from("plan=1"))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_code"], "INTERNAL");
    assert_eq!(body["message"], "internal error!");
    assert!(mock.calls().is_empty());
}

// ════════════════════════════════════════════════════════════════════════════════
// CancelSubscription / GetSubscription
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn cancel_twice_issues_one_cancellation() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);
    let subscription_id = subscribe(&app, "7").await;

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            rpc(
                "CancelSubscription",
                Some("7"),
                json!({"subscription_id": subscription_id}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subscription_id"], subscription_id.as_str());
    }

    assert_eq!(mock.call_count("cancel_subscription"), 1);
}

#[tokio::test]
async fn cancel_unknown_subscription_is_internal() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let (status, body) = send(
        &app,
        rpc(
            "CancelSubscription",
            Some("7"),
            json!({"subscription_id": "sub_missing"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_code"], "INTERNAL");
}

#[tokio::test]
async fn get_subscription_reports_lifecycle() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);
    let subscription_id = subscribe(&app, "9").await;

    let (status, body) = send(
        &app,
        rpc(
            "GetSubscription",
            Some("9"),
            json!({"subscription_id": subscription_id}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["plan_id"], 1);
    assert_eq!(body["period_end_estimated"], false);

    send(
        &app,
        rpc(
            "CancelSubscription",
            Some("9"),
            json!({"subscription_id": subscription_id}),
        ),
    )
    .await;

    let (_, body) = send(
        &app,
        rpc(
            "GetSubscription",
            Some("9"),
            json!({"subscription_id": subscription_id}),
        ),
    )
    .await;
    assert_eq!(body["status"], "CANCELED");
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhooks
// ════════════════════════════════════════════════════════════════════════════════

fn webhook(signature: Option<&str>, payload: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/stripe")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header(STRIPE_SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

fn deleted_event() -> Value {
    json!({
        "id": "evt_1",
        "type": "customer.subscription.deleted",
        "created": 1_700_000_000,
        "data": {"object": {"id": "sub_1", "customer": "cus_1"}}
    })
}

#[tokio::test]
async fn verified_webhook_is_acknowledged() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let (status, body) = send(&app, webhook(Some("t=1,v1=abc"), deleted_event())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(body["handled"], true);
}

#[tokio::test]
async fn unhandled_event_type_is_still_acknowledged() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let payload = json!({"id": "evt_2", "type": "charge.refunded", "created": 1, "data": {"object": {}}});
    let (status, body) = send(&app, webhook(Some("t=1,v1=abc"), payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handled"], false);
}

#[tokio::test]
async fn webhook_without_signature_is_bad_request() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let (status, body) = send(&app, webhook(None, deleted_event())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "MISSING_SIGNATURE");
    assert!(!mock.was_called("construct_event"));
}

#[tokio::test]
async fn webhook_with_bad_signature_is_unauthorized() {
    let mock = MockPaymentProcessor::rejecting_webhooks();
    let app = app(&mock);

    let (status, body) = send(&app, webhook(Some("t=1,v1=bad"), deleted_event())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "INVALID_WEBHOOK_SIGNATURE");
}

// ════════════════════════════════════════════════════════════════════════════════
// Health
// ════════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn health_endpoint_reports_service() {
    let mock = MockPaymentProcessor::new();
    let app = app(&mock);

    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "payment-service");
}
