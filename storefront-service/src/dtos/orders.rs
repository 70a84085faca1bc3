use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Order, OrderStatus, PackageTier};

/// Request to start checkout for a service package.
///
/// There is deliberately no amount field: the charge is always derived
/// server-side from the service's published pricing.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Service slug is required"))]
    pub service: String,

    pub package: PackageTier,

    #[validate(length(max = 2000, message = "Requirements too long"))]
    pub requirements: Option<String>,
}

/// Everything the client needs to open the hosted checkout widget;
/// contains no secret material.
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
    pub reference: String,
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1, message = "Gateway order id is required"))]
    pub gateway_order_id: String,

    #[validate(length(min = 1, message = "Gateway payment id is required"))]
    pub gateway_payment_id: String,

    #[validate(length(min = 1, message = "Signature is required"))]
    pub signature: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub reference: String,
    pub service: String,
    pub package: PackageTier,
    pub amount: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub requirements: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            reference: o.reference,
            service: o.service_slug,
            package: o.package,
            amount: o.amount,
            currency: o.currency,
            status: o.status,
            gateway_order_id: o.gateway_order_id,
            gateway_payment_id: o.gateway_payment_id,
            requirements: o.requirements,
            admin_notes: o.admin_notes,
            created_at: o.created_at.to_string(),
            updated_at: o.updated_at.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_supplied_amount_is_ignored() {
        // A forged amount field deserializes away; the DTO has no such field.
        let json = r#"{"service":"web-design","package":"standard","amount":1}"#;
        let req: CreateOrderRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.service, "web-design");
        assert_eq!(req.package, PackageTier::Standard);
        // Nothing on the request can carry a price.
    }

    #[test]
    fn test_unknown_package_tier_rejected() {
        let json = r#"{"service":"web-design","package":"platinum"}"#;
        let result = serde_json::from_str::<CreateOrderRequest>(json);
        assert!(result.is_err());
    }
}
