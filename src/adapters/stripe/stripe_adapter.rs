//! Stripe payment processor adapter.
//!
//! Implements the `PaymentProcessor` trait against the Stripe REST API.
//! Handles customers, payment methods, subscriptions, payment intents and
//! webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - API key handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key);
//! let processor = StripeProcessor::new(config);
//! ```

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::billing::{EventKind, ProcessorEvent, ProcessorStatus};
use crate::domain::foundation::UserId;
use crate::ports::{
    CreateCustomerRequest, CreateSubscriptionRequest, Customer, PaymentError, PaymentErrorCode,
    PaymentIntent, PaymentIntentStatus, PaymentMethod, PaymentProcessor, Subscription,
    SubscriptionItem,
};

use super::webhook_types::{
    SignatureHeader, StripeCustomer, StripeErrorBody, StripePaymentIntent, StripePaymentMethod,
    StripeSearchResult, StripeSubscription, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

/// Stripe payment processor adapter.
pub struct StripeProcessor {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeProcessor {
    /// Create a new Stripe processor with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// Append `segments` to the base URL, escaping each as a single segment.
    fn escaped_url(&self, segments: &[&str]) -> Result<reqwest::Url, PaymentError> {
        let mut url = reqwest::Url::parse(&self.config.api_base_url)
            .map_err(|e| PaymentError::invalid_request(format!("Invalid Stripe base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PaymentError::invalid_request("Stripe base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of a single object, e.g. `/v1/subscriptions/{id}` or
    /// `/v1/payment_intents/{id}/confirm`.
    ///
    /// Ids are rejected unless they look like Stripe object ids, so caller input
    /// can never address another resource.
    fn object_url(
        &self,
        resource: &'static str,
        id: &str,
        action: Option<&'static str>,
    ) -> Result<reqwest::Url, PaymentError> {
        if !is_object_id(id) {
            tracing::warn!(resource, "Rejected malformed Stripe object id");
            return Err(PaymentError::invalid_request(format!(
                "Malformed {} id",
                resource
            )));
        }

        match action {
            Some(action) => self.escaped_url(&["v1", resource, id, action]),
            None => self.escaped_url(&["v1", resource, id]),
        }
    }

    /// Customer creation, keyed so a repeated create for the same caller
    /// returns the customer Stripe already made.
    fn create_customer_request(&self, request: &CreateCustomerRequest) -> RequestBuilder {
        let params = [
            ("description", request.description.clone()),
            ("metadata[user_id]", request.user_id.to_string()),
        ];

        self.http_client
            .post(self.url("/v1/customers"))
            .header(IDEMPOTENCY_KEY_HEADER, customer_idempotency_key(&request.user_id))
            .form(&params)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
    }

    /// Send a request and decode a successful response.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<T, PaymentError> {
        self.send_optional(request, operation)
            .await?
            .ok_or_else(|| PaymentError::not_found("Stripe object"))
    }

    /// Send a request, mapping 404 to `Ok(None)`.
    async fn send_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<Option<T>, PaymentError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                operation,
                status = status.as_u16(),
                error = %error_text,
                "Stripe request failed"
            );
            return Err(error_from_response(&error_text));
        }

        let body = response.json::<T>().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(Some(body))
    }

    /// Verify webhook signature using HMAC-SHA256.
    ///
    /// # Security
    ///
    /// - Uses constant-time comparison to prevent timing attacks
    /// - Validates timestamp to prevent replay attacks
    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
        secret: &str,
    ) -> Result<(), PaymentError> {
        let now = chrono::Utc::now().timestamp();
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        let expected = compute_signature(secret, header.timestamp, payload)?;

        let matched = header
            .v1_signatures
            .iter()
            .any(|provided| expected.as_slice().ct_eq(provided.as_slice()).into());

        if !matched {
            tracing::warn!(
                signatures = header.v1_signatures.len(),
                "Invalid webhook signature"
            );
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Parse a verified payload into a domain event.
    fn parse_event(&self, payload: &[u8]) -> Result<ProcessorEvent, PaymentError> {
        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        Ok(ProcessorEvent {
            object_id: stripe_event.object_id(),
            customer_id: stripe_event.customer_id(),
            kind: EventKind::from_type(&stripe_event.event_type),
            created: stripe_event.created,
            id: stripe_event.id,
        })
    }
}

/// Stripe ids are `[A-Za-z0-9_]+` (`sub_1Mo...`, `pm_card_visa`).
fn is_object_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Search results lag behind writes, so a retried create right after a
/// partial failure can miss the first customer. The key makes Stripe replay it.
fn customer_idempotency_key(user_id: &UserId) -> String {
    format!("customer-create-{}", user_id)
}

/// HMAC-SHA256 over `"{timestamp}.{payload}"`.
fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::invalid_webhook(format!("Invalid signing secret: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Build a `PaymentError` from a non-2xx Stripe response body.
fn error_from_response(body: &str) -> PaymentError {
    match serde_json::from_str::<StripeErrorBody>(body) {
        Ok(parsed) => {
            let code = PaymentErrorCode::from_stripe_type(&parsed.error.error_type);
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| parsed.error.error_type.clone());
            let err = PaymentError::new(code, format!("Stripe API error: {}", message));
            match parsed.error.code {
                Some(provider_code) => err.with_provider_code(provider_code),
                None => err,
            }
        }
        Err(_) => PaymentError::provider(format!("Stripe API error: {}", body)),
    }
}

impl From<StripeCustomer> for Customer {
    fn from(c: StripeCustomer) -> Self {
        Customer {
            id: c.id,
            description: c.description,
            default_payment_method: c.invoice_settings.default_payment_method,
            created_at: c.created,
        }
    }
}

impl From<StripeSubscription> for Subscription {
    fn from(s: StripeSubscription) -> Self {
        let latest_payment_intent = s.latest_payment_intent_id();
        Subscription {
            status: ProcessorStatus::parse(&s.status),
            current_period_end: s.current_period_end,
            items: s
                .items
                .data
                .into_iter()
                .map(|item| SubscriptionItem {
                    id: item.id,
                    price_id: item.price.id,
                    current_period_end: item.current_period_end,
                })
                .collect(),
            latest_payment_intent,
            id: s.id,
            customer_id: s.customer,
        }
    }
}

impl From<StripePaymentIntent> for PaymentIntent {
    fn from(pi: StripePaymentIntent) -> Self {
        PaymentIntent {
            status: PaymentIntentStatus::parse(&pi.status),
            id: pi.id,
        }
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn find_customer(&self, user_id: &UserId) -> Result<Option<Customer>, PaymentError> {
        let query = format!("metadata['user_id']:'{}'", user_id);
        let request = self
            .http_client
            .get(self.url("/v1/customers/search"))
            .query(&[("query", query.as_str()), ("limit", "1")]);

        let result: Option<StripeSearchResult<StripeCustomer>> =
            self.send_optional(request, "find_customer").await?;

        Ok(result.and_then(|page| {
            page.data
                .into_iter()
                .find(|c| !c.deleted)
                .map(Customer::from)
        }))
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let http = self.create_customer_request(&request);
        let customer: StripeCustomer = self.send(http, "create_customer").await?;
        Ok(customer.into())
    }

    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> Result<PaymentMethod, PaymentError> {
        let http = self
            .http_client
            .post(self.object_url("payment_methods", payment_method_id, Some("attach"))?)
            .form(&[("customer", customer_id)]);

        let method: StripePaymentMethod = self.send(http, "attach_payment_method").await?;
        Ok(PaymentMethod {
            id: method.id,
            customer_id: method.customer,
        })
    }

    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<Customer, PaymentError> {
        let http = self
            .http_client
            .post(self.object_url("customers", customer_id, None)?)
            .form(&[("invoice_settings[default_payment_method]", payment_method_id)]);

        let customer: StripeCustomer = self.send(http, "set_default_payment_method").await?;
        Ok(customer.into())
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, PaymentError> {
        let params = [
            ("customer", request.customer_id.as_str()),
            ("items[0][price]", request.price_id.as_str()),
            ("payment_behavior", "default_incomplete"),
            (
                "payment_settings[save_default_payment_method]",
                "on_subscription",
            ),
            ("expand[]", "latest_invoice.payment_intent"),
        ];

        let http = self.http_client.post(self.url("/v1/subscriptions")).form(&params);
        let sub: StripeSubscription = self.send(http, "create_subscription").await?;
        Ok(sub.into())
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<Subscription>, PaymentError> {
        let http = self
            .http_client
            .get(self.object_url("subscriptions", subscription_id, None)?);

        let sub: Option<StripeSubscription> = self.send_optional(http, "get_subscription").await?;
        Ok(sub.map(Subscription::from))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        let http = self
            .http_client
            .delete(self.object_url("subscriptions", subscription_id, None)?);

        let sub: StripeSubscription = self.send(http, "cancel_subscription").await?;
        Ok(sub.into())
    }

    async fn get_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PaymentIntent>, PaymentError> {
        let http = self
            .http_client
            .get(self.object_url("payment_intents", payment_intent_id, None)?);

        let intent: Option<StripePaymentIntent> =
            self.send_optional(http, "get_payment_intent").await?;
        Ok(intent.map(PaymentIntent::from))
    }

    async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let http = self
            .http_client
            .post(self.object_url("payment_intents", payment_intent_id, Some("confirm"))?);

        let intent: StripePaymentIntent = self.send(http, "confirm_payment_intent").await?;
        Ok(intent.into())
    }

    fn construct_event(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> Result<ProcessorEvent, PaymentError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        self.verify_signature(payload, &header, secret)?;

        let event = self.parse_event(payload)?;

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.kind.as_str(),
            "Webhook signature verified"
        );

        Ok(event)
    }
}
