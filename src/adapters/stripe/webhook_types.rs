//! Stripe wire types.
//!
//! These types represent Stripe API objects as they arrive in API responses
//! and webhook payloads. Only the fields this service reads are captured;
//! everything else in Stripe's JSON is ignored.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Error parsing the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureParseError {
    /// Header is empty or missing.
    MissingHeader,
    /// Missing timestamp component (t=...).
    MissingTimestamp,
    /// Missing v1 signature component.
    MissingV1Signature,
    /// Invalid timestamp format.
    InvalidTimestamp,
    /// Invalid signature format (not valid hex).
    InvalidSignatureFormat,
}

impl std::fmt::Display for SignatureParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "Missing Stripe-Signature header"),
            Self::MissingTimestamp => write!(f, "Missing timestamp (t=) in signature"),
            Self::MissingV1Signature => write!(f, "Missing v1 signature in header"),
            Self::InvalidTimestamp => write!(f, "Invalid timestamp format"),
            Self::InvalidSignatureFormat => write!(f, "Invalid signature format (not valid hex)"),
        }
    }
}

impl std::error::Error for SignatureParseError {}

/// Parsed Stripe-Signature header components.
///
/// The header format is: `t=timestamp,v1=signature[,v1=signature...]`.
/// Stripe sends several `v1` entries while a signing secret is being rolled.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    /// Unix timestamp when Stripe generated the event.
    pub timestamp: i64,

    /// All v1 signatures (HMAC-SHA256, hex-decoded).
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parse a Stripe-Signature header into components.
    ///
    /// Unknown schemes such as the legacy `v0` are skipped.
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.trim().is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(SignatureParseError::MissingTimestamp)?;

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    let signature = hex_decode(value.trim())
                        .ok_or(SignatureParseError::InvalidSignatureFormat)?;
                    v1_signatures.push(signature);
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

/// Decode a hex string to bytes.
fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

/// Encode bytes to hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Event Types
// ════════════════════════════════════════════════════════════════════════════════

/// Raw Stripe webhook event as received from the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "payment_intent.succeeded").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    pub created: i64,

    /// Event payload containing the affected object.
    pub data: StripeEventData,

    /// Whether this is a live or test event.
    #[serde(default)]
    pub livemode: bool,
}

/// Event data container.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object affected by this event.
    pub object: serde_json::Value,
}

impl StripeWebhookEvent {
    /// Id of the object the event is about.
    pub fn object_id(&self) -> Option<String> {
        self.data
            .object
            .get("id")
            .and_then(|v| v.as_str())
            .map(String::from)
    }

    /// Customer that owns the event object.
    pub fn customer_id(&self) -> Option<String> {
        self.data
            .object
            .get("customer")
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Customer object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCustomer {
    /// Unique customer identifier (cus_...).
    pub id: String,

    pub description: Option<String>,

    /// Unix timestamp of creation.
    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub metadata: std::collections::HashMap<String, String>,

    #[serde(default)]
    pub invoice_settings: StripeInvoiceSettings,

    /// Whether the customer has been deleted.
    #[serde(default)]
    pub deleted: bool,
}

/// Customer invoice settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StripeInvoiceSettings {
    pub default_payment_method: Option<String>,
}

/// Result page of a Stripe search endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSearchResult<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Stripe PaymentMethod object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePaymentMethod {
    /// Payment method identifier (pm_...).
    pub id: String,

    pub customer: Option<String>,
}

/// Stripe Subscription object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscription {
    /// Unique subscription identifier (sub_...).
    pub id: String,

    /// Customer ID owning this subscription.
    pub customer: String,

    /// Subscription status.
    pub status: String,

    /// Current period end. Newer API versions report it per item only.
    pub current_period_end: Option<i64>,

    /// Subscription items (price/quantity pairs).
    #[serde(default)]
    pub items: StripeSubscriptionItems,

    /// Latest invoice, either an id or the expanded object.
    pub latest_invoice: Option<serde_json::Value>,
}

impl StripeSubscription {
    /// Payment intent id of the expanded latest invoice.
    pub fn latest_payment_intent_id(&self) -> Option<String> {
        let intent = self.latest_invoice.as_ref()?.get("payment_intent")?;
        intent
            .as_str()
            .or_else(|| intent.get("id").and_then(|v| v.as_str()))
            .map(String::from)
    }
}

/// Subscription items container.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StripeSubscriptionItems {
    /// List of subscription items.
    #[serde(default)]
    pub data: Vec<StripeSubscriptionItem>,
}

/// Single subscription item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscriptionItem {
    /// Item ID.
    pub id: String,

    /// Price object.
    pub price: StripePrice,

    pub current_period_end: Option<i64>,
}

/// Stripe Price object (embedded in subscription items).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePrice {
    /// Price ID.
    pub id: String,
}

/// Stripe PaymentIntent object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePaymentIntent {
    /// Payment intent identifier (pi_...).
    pub id: String,

    pub status: String,
}

/// Error body returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeErrorBody {
    pub error: StripeApiError,
}

/// Stripe API error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeApiError {
    #[serde(rename = "type")]
    pub error_type: String,

    pub code: Option<String>,

    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ════════════════════════════════════════════════════════════════════════════
    // SignatureHeader Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_signature_header_valid() {
        let header = "t=1704067200,v1=5d41402abc4b2a76b9719d911017c592";
        let parsed = SignatureHeader::parse(header).unwrap();

        assert_eq!(parsed.timestamp, 1704067200);
        assert_eq!(parsed.v1_signatures.len(), 1);
        assert_eq!(
            hex_encode(&parsed.v1_signatures[0]),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn parse_signature_header_collects_every_v1() {
        let header = "t=1704067200,v1=aabb,v1=ccdd,v0=eeff";
        let parsed = SignatureHeader::parse(header).unwrap();

        assert_eq!(parsed.v1_signatures.len(), 2);
        assert_eq!(hex_encode(&parsed.v1_signatures[1]), "ccdd");
    }

    #[test]
    fn parse_signature_header_missing_timestamp() {
        let header = "v1=5d41402abc4b2a76b9719d911017c592";
        let result = SignatureHeader::parse(header);
        assert!(matches!(result, Err(SignatureParseError::MissingTimestamp)));
    }

    #[test]
    fn parse_signature_header_missing_v1() {
        let header = "t=1704067200,v0=aabbccdd";
        let result = SignatureHeader::parse(header);
        assert!(matches!(result, Err(SignatureParseError::MissingV1Signature)));
    }

    #[test]
    fn parse_signature_header_empty() {
        let result = SignatureHeader::parse("");
        assert!(matches!(result, Err(SignatureParseError::MissingHeader)));
    }

    #[test]
    fn parse_signature_header_invalid_timestamp() {
        let header = "t=not_a_number,v1=5d41402abc4b2a76b9719d911017c592";
        let result = SignatureHeader::parse(header);
        assert!(matches!(result, Err(SignatureParseError::InvalidTimestamp)));
    }

    #[test]
    fn parse_signature_header_invalid_hex() {
        let header = "t=1704067200,v1=not_valid_hex_xyz";
        let result = SignatureHeader::parse(header);
        assert!(matches!(result, Err(SignatureParseError::InvalidSignatureFormat)));
    }

    #[test]
    fn parse_signature_header_odd_length_hex() {
        let header = "t=1704067200,v1=abc";
        let result = SignatureHeader::parse(header);
        assert!(matches!(result, Err(SignatureParseError::InvalidSignatureFormat)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Hex Encoding Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn hex_encode_bytes() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
        assert_eq!(hex_encode(&[]), "");
    }

    #[test]
    fn hex_decode_rejects_non_ascii() {
        assert!(hex_decode("é1").is_none());
    }

    #[test]
    fn hex_decode_matches_encode() {
        let original = vec![0xde, 0xad, 0xbe, 0xef];
        assert_eq!(hex_decode(&hex_encode(&original)), Some(original));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Object Parsing Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn parse_payment_intent_event() {
        let json = r#"{
            "id": "evt_pi",
            "type": "payment_intent.succeeded",
            "created": 1704067200,
            "data": {
                "object": {
                    "id": "pi_123",
                    "object": "payment_intent",
                    "customer": "cus_abc",
                    "status": "succeeded"
                }
            },
            "livemode": false
        }"#;

        let event: StripeWebhookEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.event_type, "payment_intent.succeeded");
        assert_eq!(event.object_id(), Some("pi_123".to_string()));
        assert_eq!(event.customer_id(), Some("cus_abc".to_string()));
    }

    #[test]
    fn parse_subscription_with_item_period_end() {
        let json = r#"{
            "id": "sub_test_123",
            "object": "subscription",
            "customer": "cus_test_xyz",
            "status": "active",
            "items": {
                "object": "list",
                "data": [{
                    "id": "si_1",
                    "price": {"id": "price_pro_456", "currency": "usd"},
                    "quantity": 1,
                    "current_period_end": 1706745600
                }]
            }
        }"#;

        let sub: StripeSubscription = serde_json::from_str(json).unwrap();

        assert!(sub.current_period_end.is_none());
        assert_eq!(sub.items.data[0].price.id, "price_pro_456");
        assert_eq!(sub.items.data[0].current_period_end, Some(1706745600));
        assert!(sub.latest_payment_intent_id().is_none());
    }

    #[test]
    fn subscription_items_default_to_empty() {
        let json = r#"{"id": "sub_1", "customer": "cus_1", "status": "canceled"}"#;
        let sub: StripeSubscription = serde_json::from_str(json).unwrap();
        assert!(sub.items.data.is_empty());
    }

    #[test]
    fn latest_payment_intent_read_from_expanded_invoice() {
        let json = r#"{
            "id": "sub_1",
            "customer": "cus_1",
            "status": "incomplete",
            "latest_invoice": {"id": "in_1", "payment_intent": {"id": "pi_9", "status": "requires_payment_method"}}
        }"#;
        let sub: StripeSubscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.latest_payment_intent_id(), Some("pi_9".to_string()));
    }

    #[test]
    fn latest_payment_intent_read_from_unexpanded_reference() {
        let json = r#"{
            "id": "sub_1",
            "customer": "cus_1",
            "status": "incomplete",
            "latest_invoice": {"id": "in_1", "payment_intent": "pi_7"}
        }"#;
        let sub: StripeSubscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.latest_payment_intent_id(), Some("pi_7".to_string()));
    }

    #[test]
    fn parse_customer_with_default_payment_method() {
        let json = r#"{
            "id": "cus_1",
            "object": "customer",
            "description": "Customer for user 42",
            "created": 1704067200,
            "metadata": {"user_id": "42"},
            "invoice_settings": {"default_payment_method": "pm_card"}
        }"#;
        let customer: StripeCustomer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.metadata.get("user_id"), Some(&"42".to_string()));
        assert_eq!(
            customer.invoice_settings.default_payment_method,
            Some("pm_card".to_string())
        );
        assert!(!customer.deleted);
    }

    #[test]
    fn parse_error_body() {
        let json = r#"{"error": {"type": "card_error", "code": "card_declined", "message": "Your card was declined."}}"#;
        let body: StripeErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.error_type, "card_error");
        assert_eq!(body.error.code.as_deref(), Some("card_declined"));
    }
}
