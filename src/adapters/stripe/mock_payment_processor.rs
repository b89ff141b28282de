//! Mock payment processor for testing.
//!
//! Provides a configurable in-memory implementation of `PaymentProcessor` for
//! unit and integration tests. Supports:
//! - Pre-seeded customers, subscriptions and payment intents
//! - Error injection, per method or one-shot
//! - Call tracking
//! - Webhook acceptance or rejection

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::billing::{EventKind, ProcessorEvent, ProcessorStatus};
use crate::domain::foundation::UserId;
use crate::ports::{
    CreateCustomerRequest, CreateSubscriptionRequest, Customer, PaymentError, PaymentIntent,
    PaymentIntentStatus, PaymentMethod, PaymentProcessor, Subscription, SubscriptionItem,
};

/// Thirty days, used for the period end of mock-created subscriptions.
const MOCK_PERIOD_SECS: i64 = 30 * 24 * 60 * 60;

/// Mock payment processor for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProcessor::new();
/// mock.set_method_error("attach_payment_method", PaymentError::provider("No such PaymentMethod"));
///
/// let handler = CreateSubscriptionHandler::new(Arc::new(mock.clone()), PlanCatalog::standard());
/// ```
#[derive(Default)]
pub struct MockPaymentProcessor {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Customers by processor id.
    customers: HashMap<String, Customer>,

    /// Customer ids by caller id, mirroring `metadata.user_id`.
    customers_by_user: HashMap<i64, String>,

    subscriptions: HashMap<String, Subscription>,

    payment_intents: HashMap<String, PaymentIntent>,

    /// Customer search does not yet see created customers.
    search_lagging: bool,

    /// Status given to subscriptions created through the mock.
    created_status: Option<ProcessorStatus>,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    call_log: Vec<MethodCall>,

    webhook_verify_mode: WebhookVerifyMode,

    sequence: u32,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

#[derive(Default, Clone)]
enum WebhookVerifyMode {
    /// Accept any signature and parse the payload.
    #[default]
    AcceptAll,

    /// Always fail verification.
    AlwaysFail,
}

impl MockPaymentProcessor {
    /// Create a new mock processor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Seed a customer owned by `user_id`.
    pub fn add_customer(&self, user_id: UserId, customer: Customer) {
        let mut state = self.inner.lock().unwrap();
        state
            .customers_by_user
            .insert(user_id.as_i64(), customer.id.clone());
        state.customers.insert(customer.id.clone(), customer);
    }

    /// Seed a subscription.
    pub fn add_subscription(&self, subscription: Subscription) {
        let id = subscription.id.clone();
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .insert(id, subscription);
    }

    /// Seed a payment intent.
    pub fn add_payment_intent(&self, intent: PaymentIntent) {
        let id = intent.id.clone();
        self.inner
            .lock()
            .unwrap()
            .payment_intents
            .insert(id, intent);
    }

    /// Make customer search miss every customer, like Stripe's search index
    /// before it catches up with recent creates.
    pub fn lag_customer_search(&self) {
        self.inner.lock().unwrap().search_lagging = true;
    }

    /// Status for subscriptions created from now on (default `active`).
    pub fn set_created_status(&self, status: ProcessorStatus) {
        self.inner.lock().unwrap().created_status = Some(status);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Inspection
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    pub fn customer(&self, customer_id: &str) -> Option<Customer> {
        self.inner.lock().unwrap().customers.get(customer_id).cloned()
    }

    pub fn subscription(&self, subscription_id: &str) -> Option<Subscription> {
        self.inner
            .lock()
            .unwrap()
            .subscriptions
            .get(subscription_id)
            .cloned()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.inner.lock().unwrap();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }

    fn next_id(state: &mut MockState, prefix: &str) -> String {
        state.sequence += 1;
        format!("{}_mock_{}", prefix, state.sequence)
    }
}

impl Clone for MockPaymentProcessor {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Read an event out of a JSON payload without checking any signature.
fn event_from_payload(payload: &[u8]) -> Result<ProcessorEvent, PaymentError> {
    let value: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| PaymentError::invalid_webhook(format!("Invalid JSON: {}", e)))?;

    let object = value.pointer("/data/object");
    let field = |v: Option<&serde_json::Value>, key: &str| {
        v.and_then(|o| o.get(key))
            .and_then(|s| s.as_str())
            .map(String::from)
    };

    Ok(ProcessorEvent {
        id: field(Some(&value), "id").unwrap_or_default(),
        kind: EventKind::from_type(&field(Some(&value), "type").unwrap_or_default()),
        created: value.get("created").and_then(|c| c.as_i64()).unwrap_or(0),
        object_id: field(object, "id"),
        customer_id: field(object, "customer"),
    })
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn find_customer(&self, user_id: &UserId) -> Result<Option<Customer>, PaymentError> {
        self.record_call("find_customer", vec![user_id.to_string()]);
        self.check_error("find_customer")?;

        let state = self.inner.lock().unwrap();
        if state.search_lagging {
            return Ok(None);
        }
        Ok(state
            .customers_by_user
            .get(&user_id.as_i64())
            .and_then(|id| state.customers.get(id))
            .cloned())
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        self.record_call(
            "create_customer",
            vec![request.user_id.to_string(), request.description.clone()],
        );
        self.check_error("create_customer")?;

        let mut state = self.inner.lock().unwrap();

        // Same caller, same idempotency key: replay the first create.
        if let Some(existing) = state
            .customers_by_user
            .get(&request.user_id.as_i64())
            .and_then(|id| state.customers.get(id))
        {
            return Ok(existing.clone());
        }

        let customer = Customer {
            id: Self::next_id(&mut state, "cus"),
            description: Some(request.description),
            default_payment_method: None,
            created_at: chrono::Utc::now().timestamp(),
        };

        state
            .customers_by_user
            .insert(request.user_id.as_i64(), customer.id.clone());
        state.customers.insert(customer.id.clone(), customer.clone());

        Ok(customer)
    }

    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> Result<PaymentMethod, PaymentError> {
        self.record_call(
            "attach_payment_method",
            vec![payment_method_id.to_string(), customer_id.to_string()],
        );
        self.check_error("attach_payment_method")?;

        Ok(PaymentMethod {
            id: payment_method_id.to_string(),
            customer_id: Some(customer_id.to_string()),
        })
    }

    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<Customer, PaymentError> {
        self.record_call(
            "set_default_payment_method",
            vec![customer_id.to_string(), payment_method_id.to_string()],
        );
        self.check_error("set_default_payment_method")?;

        let mut state = self.inner.lock().unwrap();
        let customer = state
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| PaymentError::not_found("Customer"))?;
        customer.default_payment_method = Some(payment_method_id.to_string());

        Ok(customer.clone())
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, PaymentError> {
        self.record_call(
            "create_subscription",
            vec![request.customer_id.clone(), request.price_id.clone()],
        );
        self.check_error("create_subscription")?;

        let mut state = self.inner.lock().unwrap();
        let period_end = chrono::Utc::now().timestamp() + MOCK_PERIOD_SECS;
        let intent_id = Self::next_id(&mut state, "pi");
        let subscription = Subscription {
            id: Self::next_id(&mut state, "sub"),
            customer_id: request.customer_id,
            status: state
                .created_status
                .clone()
                .unwrap_or(ProcessorStatus::Active),
            current_period_end: None,
            items: vec![SubscriptionItem {
                id: Self::next_id(&mut state, "si"),
                price_id: request.price_id,
                current_period_end: Some(period_end),
            }],
            latest_payment_intent: Some(intent_id.clone()),
        };

        state.payment_intents.insert(
            intent_id.clone(),
            PaymentIntent {
                id: intent_id,
                status: PaymentIntentStatus::RequiresConfirmation,
            },
        );
        state
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());

        Ok(subscription)
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Subscription>, PaymentError> {
        self.record_call("get_subscription", vec![subscription_id.to_string()]);
        self.check_error("get_subscription")?;

        Ok(self.subscription(subscription_id))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        self.record_call("cancel_subscription", vec![subscription_id.to_string()]);
        self.check_error("cancel_subscription")?;

        let mut state = self.inner.lock().unwrap();
        let subscription = state
            .subscriptions
            .get_mut(subscription_id)
            .ok_or_else(|| PaymentError::not_found("Subscription"))?;
        subscription.status = ProcessorStatus::Canceled;

        Ok(subscription.clone())
    }

    async fn get_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PaymentIntent>, PaymentError> {
        self.record_call("get_payment_intent", vec![payment_intent_id.to_string()]);
        self.check_error("get_payment_intent")?;

        let state = self.inner.lock().unwrap();
        Ok(state.payment_intents.get(payment_intent_id).cloned())
    }

    async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        self.record_call(
            "confirm_payment_intent",
            vec![payment_intent_id.to_string()],
        );
        self.check_error("confirm_payment_intent")?;

        let mut state = self.inner.lock().unwrap();
        let intent = state
            .payment_intents
            .get_mut(payment_intent_id)
            .ok_or_else(|| PaymentError::not_found("PaymentIntent"))?;
        intent.status = PaymentIntentStatus::Succeeded;

        Ok(intent.clone())
    }

    fn construct_event(
        &self,
        payload: &[u8],
        signature: &str,
        _secret: &str,
    ) -> Result<ProcessorEvent, PaymentError> {
        self.record_call("construct_event", vec![signature.to_string()]);
        self.check_error("construct_event")?;

        let mode = self.inner.lock().unwrap().webhook_verify_mode.clone();
        match mode {
            WebhookVerifyMode::AcceptAll => event_from_payload(payload),
            WebhookVerifyMode::AlwaysFail => {
                Err(PaymentError::invalid_webhook("Invalid signature"))
            }
        }
    }
}
