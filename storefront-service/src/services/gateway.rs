//! Hosted payment gateway client.
//!
//! Implements the gateway's Orders API for payment initiation and HMAC
//! signature verification for payment confirmation.

use crate::config::GatewayConfig;
use anyhow::{anyhow, Result};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use site_core::utils::signature;

/// Client for the hosted payment gateway.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

/// Request to open a payment intent with the gateway.
#[derive(Debug, Serialize)]
pub struct CreateIntentRequest {
    /// Amount in the smallest currency unit.
    pub amount: i64,
    pub currency: String,
    /// Our order reference, echoed back by the gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

/// Gateway-side order (payment intent) as returned by the Orders API.
#[derive(Debug, Deserialize)]
pub struct GatewayOrder {
    /// Gateway's own order id, distinct from our order id.
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
    pub created_at: u64,
}

#[derive(Debug, Deserialize)]
pub struct GatewayApiError {
    pub error: GatewayApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct GatewayApiErrorDetail {
    pub code: String,
    pub description: String,
}

/// Parameters of a checkout-completion callback.
#[derive(Debug)]
pub struct CheckoutCallback {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
}

/// Gateway webhook event envelope.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub payment: Option<WebhookPaymentEntity>,
    pub order: Option<WebhookOrderEntity>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPaymentEntity {
    pub entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
pub struct WebhookOrderEntity {
    pub entity: GatewayOrder,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub order_id: Option<String>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Check whether gateway credentials are configured.
    pub fn is_configured(&self) -> bool {
        !self.config.key_id.is_empty() && !self.config.key_secret.expose_secret().is_empty()
    }

    /// Public key id for the hosted checkout widget. Safe to hand to clients.
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// Open a payment intent with the gateway.
    ///
    /// `amount` is in the smallest currency unit and has already been
    /// derived server-side from the service catalog.
    pub async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder> {
        if !self.is_configured() {
            return Err(anyhow!("Payment gateway credentials not configured"));
        }

        let request = CreateIntentRequest {
            amount,
            currency: currency.to_string(),
            receipt: Some(receipt.to_string()),
        };

        let url = format!("{}/orders", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, body = %body, "Gateway create_intent response");

        if status.is_success() {
            let order: GatewayOrder = serde_json::from_str(&body)?;
            tracing::info!(
                gateway_order_id = %order.id,
                amount = order.amount,
                currency = %order.currency,
                "Payment intent created"
            );
            Ok(order)
        } else {
            let error: GatewayApiError =
                serde_json::from_str(&body).unwrap_or_else(|_| GatewayApiError {
                    error: GatewayApiErrorDetail {
                        code: "UNKNOWN".to_string(),
                        description: body.clone(),
                    },
                });
            tracing::error!(
                code = %error.error.code,
                description = %error.error.description,
                "Payment intent creation failed"
            );
            Err(anyhow!(
                "Gateway error: {} - {}",
                error.error.code,
                error.error.description
            ))
        }
    }

    /// Verify the checkout-completion signature.
    ///
    /// The signature is `HMAC-SHA256(order_id + "|" + payment_id, key_secret)`;
    /// comparison is constant-time.
    pub fn verify_checkout(&self, callback: &CheckoutCallback) -> Result<bool> {
        let is_valid = signature::verify_checkout_signature(
            self.config.key_secret.expose_secret(),
            &callback.gateway_order_id,
            &callback.gateway_payment_id,
            &callback.signature,
        )?;

        if !is_valid {
            tracing::warn!(
                gateway_order_id = %callback.gateway_order_id,
                gateway_payment_id = %callback.gateway_payment_id,
                "Checkout signature verification failed"
            );
        }

        Ok(is_valid)
    }

    /// Verify a webhook signature: `HMAC-SHA256(request_body, webhook_secret)`.
    pub fn verify_webhook(&self, body: &str, signature_header: &str) -> Result<bool> {
        let is_valid = signature::verify_webhook_signature(
            self.config.webhook_secret.expose_secret(),
            body,
            signature_header,
        )?;

        if !is_valid {
            tracing::warn!("Webhook signature verification failed");
        }

        Ok(is_valid)
    }

    pub fn parse_webhook_event(&self, body: &str) -> Result<WebhookEvent> {
        let event: WebhookEvent = serde_json::from_str(body)?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            key_id: "rzp_test_123".to_string(),
            key_secret: Secret::new("test_secret".to_string()),
            webhook_secret: Secret::new("webhook_secret".to_string()),
            api_base_url: "https://api.razorpay.com/v1".to_string(),
            currency: "INR".to_string(),
        }
    }

    #[test]
    fn test_is_configured() {
        let client = GatewayClient::new(test_config());
        assert!(client.is_configured());

        let empty = GatewayConfig {
            key_id: "".to_string(),
            key_secret: Secret::new("".to_string()),
            webhook_secret: Secret::new("".to_string()),
            api_base_url: "".to_string(),
            currency: "INR".to_string(),
        };
        let client = GatewayClient::new(empty);
        assert!(!client.is_configured());
    }

    #[test]
    fn test_checkout_signature_verification() {
        let client = GatewayClient::new(test_config());

        let expected =
            signature::checkout_signature("test_secret", "order_123", "pay_456").unwrap();

        let callback = CheckoutCallback {
            gateway_order_id: "order_123".to_string(),
            gateway_payment_id: "pay_456".to_string(),
            signature: expected,
        };

        assert!(client.verify_checkout(&callback).unwrap());
    }

    #[test]
    fn test_tampered_payment_id_rejected() {
        let client = GatewayClient::new(test_config());

        // Signed over pay_456, claimed for pay_789.
        let signed = signature::checkout_signature("test_secret", "order_123", "pay_456").unwrap();

        let callback = CheckoutCallback {
            gateway_order_id: "order_123".to_string(),
            gateway_payment_id: "pay_789".to_string(),
            signature: signed,
        };

        assert!(!client.verify_checkout(&callback).unwrap());
    }

    #[test]
    fn test_webhook_event_parsing() {
        let client = GatewayClient::new(test_config());

        let body = r#"{
            "event": "payment.captured",
            "payload": {
                "payment": {
                    "entity": {
                        "id": "pay_456",
                        "amount": 4999,
                        "currency": "INR",
                        "status": "captured",
                        "order_id": "order_123"
                    }
                },
                "order": null
            }
        }"#;

        let event = client.parse_webhook_event(body).unwrap();
        assert_eq!(event.event, "payment.captured");
        let payment = event.payload.payment.unwrap().entity;
        assert_eq!(payment.id, "pay_456");
        assert_eq!(payment.order_id.as_deref(), Some("order_123"));
    }
}
