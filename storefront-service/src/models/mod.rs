use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Stored lower-cased and trimmed; uniqueness is enforced by index.
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
}

/// Fixed pricing levels offered for every service.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PackageTier {
    Basic,
    Standard,
    Premium,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PackagePricing {
    /// Price in the smallest currency unit.
    pub price: i64,
    pub features: Vec<String>,
}

/// Catalog entry; the single source of truth for order amounts.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub pricing: HashMap<PackageTier, PackagePricing>,
    pub active: bool,
}

impl Service {
    /// Published price for a tier, if the service offers it.
    pub fn price_for(&self, tier: PackageTier) -> Option<i64> {
        self.pricing.get(&tier).map(|p| p.price)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Transitions an admin operator may apply. `Paid` is deliberately
    /// unreachable here: only signature-verified settlement sets it.
    pub fn admin_can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Pending, Cancelled)
                | (Paid, Processing)
                | (Paid, Cancelled)
                | (Paid, Refunded)
                | (Processing, Completed)
                | (Processing, Cancelled)
                | (Completed, Refunded)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Human-facing order reference, also sent to the gateway as receipt.
    pub reference: String,
    pub customer_id: Uuid,
    pub service_id: Uuid,
    pub service_slug: String,
    pub package: PackageTier,
    /// Amount in the smallest currency unit, derived from the catalog.
    pub amount: i64,
    pub currency: String,
    pub status: OrderStatus,
    pub gateway_order_id: Option<String>,
    /// Set exactly once, by payment settlement.
    pub gateway_payment_id: Option<String>,
    pub requirements: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Order {
    pub fn new_reference() -> String {
        format!("ORD-{}", Uuid::new_v4().simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_standard_price(price: i64) -> Service {
        let mut pricing = HashMap::new();
        pricing.insert(
            PackageTier::Standard,
            PackagePricing {
                price,
                features: vec!["5 pages".to_string()],
            },
        );
        Service {
            id: Uuid::new_v4(),
            slug: "web-design".to_string(),
            name: "Web Design".to_string(),
            category: "design".to_string(),
            pricing,
            active: true,
        }
    }

    #[test]
    fn test_price_for_known_tier() {
        let service = service_with_standard_price(4999);
        assert_eq!(service.price_for(PackageTier::Standard), Some(4999));
    }

    #[test]
    fn test_price_for_unknown_tier() {
        let service = service_with_standard_price(4999);
        assert_eq!(service.price_for(PackageTier::Premium), None);
    }

    #[test]
    fn test_admin_transitions() {
        use OrderStatus::*;

        assert!(Paid.admin_can_transition(Processing));
        assert!(Paid.admin_can_transition(Refunded));
        assert!(Processing.admin_can_transition(Completed));
        assert!(Pending.admin_can_transition(Cancelled));

        // Only the verifier may mark an order paid.
        assert!(!Pending.admin_can_transition(Paid));
        assert!(!Cancelled.admin_can_transition(Paid));

        // No resurrection of terminal states.
        assert!(!Cancelled.admin_can_transition(Processing));
        assert!(!Refunded.admin_can_transition(Completed));
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");

        let tier: PackageTier = serde_json::from_str("\"premium\"").unwrap();
        assert_eq!(tier, PackageTier::Premium);
    }

    #[test]
    fn test_order_reference_prefix() {
        let reference = Order::new_reference();
        assert!(reference.starts_with("ORD-"));
        assert!(reference.len() > 10);
    }
}
