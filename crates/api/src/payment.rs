//! Payment-processor client for premium upgrades.
//!
//! Wraps the processor's checkout-session HTTP API using [`reqwest`]. The
//! processor hosts the actual payment page; this client only creates checkout
//! sessions (fixed $4.99 "Premium Access" line item) and deserializes the
//! webhook events the processor posts back. Webhook signature verification is
//! handled upstream of this service.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tessera_core::types::DbId;

/// Price of the premium upgrade in USD cents.
const PREMIUM_PRICE_CENTS: i64 = 499;

/// Product name shown on the processor's checkout page.
const PREMIUM_PRODUCT_NAME: &str = "Premium Access";

/// Product description shown on the processor's checkout page.
const PREMIUM_PRODUCT_DESCRIPTION: &str = "Unlock download & screenshot permissions";

/// Webhook event type that marks a completed premium purchase.
pub const CHECKOUT_COMPLETED_EVENT: &str = "checkout.session.completed";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from the payment-processor API layer.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The processor returned a non-2xx status code.
    #[error("Payment API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// PaymentConfig
// ---------------------------------------------------------------------------

/// Default processor API base URL.
const DEFAULT_API_URL: &str = "https://api.stripe.com";

/// Configuration for the payment-processor client.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Secret API key used as a bearer credential.
    pub secret_key: String,
    /// Processor API base URL (overridable for tests).
    pub api_url: String,
}

impl PaymentConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `STRIPE_SECRET_KEY` is not set, signalling that
    /// payments are not configured.
    ///
    /// | Variable            | Required | Default                  |
    /// |---------------------|----------|--------------------------|
    /// | `STRIPE_SECRET_KEY` | yes      | --                        |
    /// | `STRIPE_API_URL`    | no       | `https://api.stripe.com` |
    pub fn from_env() -> Option<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY").ok().filter(|k| !k.is_empty())?;
        Some(Self {
            secret_key,
            api_url: std::env::var("STRIPE_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// PaymentClient
// ---------------------------------------------------------------------------

/// Checkout session created by the processor.
///
/// The id is all the frontend needs to redirect the buyer to the hosted
/// payment page.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
}

/// HTTP client for the payment processor.
pub struct PaymentClient {
    client: reqwest::Client,
    config: PaymentConfig,
}

impl PaymentClient {
    /// Create a new client with the given configuration.
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a checkout session for the premium upgrade.
    ///
    /// * `user_id` - the authenticated buyer, carried in the session metadata
    ///   so the webhook can attribute the completed payment.
    /// * `frontend_url` - base URL for the success/cancel redirect pages.
    pub async fn create_checkout_session(
        &self,
        user_id: DbId,
        frontend_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let form = checkout_form(user_id, frontend_url);

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.config.api_url))
            .bearer_auth(&self.config.secret_key)
            .form(&form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Parse a successful JSON response body into the expected type, or
    /// surface the status and body text on failure.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PaymentError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

/// Build the form-encoded checkout session parameters.
///
/// The processor expects bracketed field names for nested structures. The
/// literal `{CHECKOUT_SESSION_ID}` placeholder in the success URL is
/// substituted by the processor at redirect time.
fn checkout_form(user_id: DbId, frontend_url: &str) -> Vec<(&'static str, String)> {
    let frontend_url = frontend_url.trim_end_matches('/');
    vec![
        ("mode", "payment".to_string()),
        ("payment_method_types[0]", "card".to_string()),
        ("line_items[0][price_data][currency]", "usd".to_string()),
        (
            "line_items[0][price_data][unit_amount]",
            PREMIUM_PRICE_CENTS.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            PREMIUM_PRODUCT_NAME.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][description]",
            PREMIUM_PRODUCT_DESCRIPTION.to_string(),
        ),
        ("line_items[0][quantity]", "1".to_string()),
        (
            "success_url",
            format!("{frontend_url}/payment/success?session_id={{CHECKOUT_SESSION_ID}}"),
        ),
        ("cancel_url", format!("{frontend_url}/payment/cancel")),
        ("metadata[user_id]", user_id.to_string()),
    ]
}

// ---------------------------------------------------------------------------
// Webhook events
// ---------------------------------------------------------------------------

/// Event envelope posted by the processor to the webhook endpoint.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    /// Event type, e.g. `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: CheckoutObject,
}

/// Checkout session object embedded in a webhook event.
#[derive(Debug, Deserialize)]
pub struct CheckoutObject {
    pub id: String,
    /// Processor-side customer id, when one was created.
    #[serde(default)]
    pub customer: Option<String>,
    /// Metadata echoed back from session creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutObject {
    /// The buyer's user id from the session metadata, if present and numeric.
    pub fn user_id(&self) -> Option<DbId> {
        self.metadata.get("user_id")?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_form_carries_price_product_and_metadata() {
        let form = checkout_form(42, "http://localhost:3000/");
        let lookup = |k: &str| {
            form.iter()
                .find(|(key, _)| *key == k)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(lookup("mode"), Some("payment"));
        assert_eq!(lookup("line_items[0][price_data][unit_amount]"), Some("499"));
        assert_eq!(
            lookup("line_items[0][price_data][product_data][name]"),
            Some("Premium Access")
        );
        assert_eq!(lookup("metadata[user_id]"), Some("42"));
        assert_eq!(
            lookup("success_url"),
            Some("http://localhost:3000/payment/success?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(
            lookup("cancel_url"),
            Some("http://localhost:3000/payment/cancel")
        );
    }

    #[test]
    fn webhook_event_deserializes_completed_checkout() {
        let json = serde_json::json!({
            "id": "evt_123",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_789",
                    "customer": "cus_456",
                    "metadata": { "user_id": "17" }
                }
            }
        });

        let event: WebhookEvent =
            serde_json::from_value(json).expect("event should deserialize");
        assert_eq!(event.event_type, CHECKOUT_COMPLETED_EVENT);
        assert_eq!(event.data.object.id, "cs_test_789");
        assert_eq!(event.data.object.customer.as_deref(), Some("cus_456"));
        assert_eq!(event.data.object.user_id(), Some(17));
    }

    #[test]
    fn webhook_event_tolerates_missing_metadata() {
        let json = serde_json::json!({
            "type": "invoice.paid",
            "data": { "object": { "id": "in_1" } }
        });

        let event: WebhookEvent =
            serde_json::from_value(json).expect("event should deserialize");
        assert_eq!(event.event_type, "invoice.paid");
        assert_eq!(event.data.object.user_id(), None);
        assert_eq!(event.data.object.customer, None);
    }

    #[test]
    fn payment_config_none_without_secret_key() {
        std::env::remove_var("STRIPE_SECRET_KEY");
        assert!(PaymentConfig::from_env().is_none());
    }
}
