//! Settlement decision for the `Pending -> Paid` transition.
//!
//! Pure over an already-loaded order so the ownership and idempotency rules
//! can be tested without a database. The caller has already verified the
//! gateway signature; the conditional storage update in the repository is
//! what makes the transition race-safe.

use crate::models::{Order, OrderStatus};
use site_core::error::AppError;
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq)]
pub enum Settlement {
    /// Order is pending; apply the paid transition.
    Transition,
    /// Same payment already applied; succeed without side effects.
    AlreadyPaid,
}

pub fn decide(
    order: &Order,
    customer_id: Uuid,
    gateway_payment_id: &str,
) -> Result<Settlement, AppError> {
    if order.customer_id != customer_id {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Order does not belong to this customer"
        )));
    }

    match order.status {
        OrderStatus::Pending => Ok(Settlement::Transition),
        OrderStatus::Paid => {
            if order.gateway_payment_id.as_deref() == Some(gateway_payment_id) {
                // Duplicate callback for the same payment is harmless.
                Ok(Settlement::AlreadyPaid)
            } else {
                Err(AppError::Conflict(anyhow::anyhow!(
                    "Order already settled with a different payment"
                )))
            }
        }
        _ => Err(AppError::Conflict(anyhow::anyhow!(
            "Order is not awaiting payment"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PackageTier;
    use mongodb::bson::DateTime;

    fn pending_order(customer_id: Uuid) -> Order {
        let now = DateTime::now();
        Order {
            id: Uuid::new_v4(),
            reference: Order::new_reference(),
            customer_id,
            service_id: Uuid::new_v4(),
            service_slug: "web-design".to_string(),
            package: PackageTier::Standard,
            amount: 4999,
            currency: "INR".to_string(),
            status: OrderStatus::Pending,
            gateway_order_id: Some("order_123".to_string()),
            gateway_payment_id: None,
            requirements: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pending_order_transitions() {
        let customer = Uuid::new_v4();
        let order = pending_order(customer);

        let decision = decide(&order, customer, "pay_456").unwrap();
        assert_eq!(decision, Settlement::Transition);
    }

    #[test]
    fn test_replay_is_idempotent() {
        let customer = Uuid::new_v4();
        let mut order = pending_order(customer);
        order.status = OrderStatus::Paid;
        order.gateway_payment_id = Some("pay_456".to_string());

        let decision = decide(&order, customer, "pay_456").unwrap();
        assert_eq!(decision, Settlement::AlreadyPaid);
    }

    #[test]
    fn test_second_payment_id_refused() {
        let customer = Uuid::new_v4();
        let mut order = pending_order(customer);
        order.status = OrderStatus::Paid;
        order.gateway_payment_id = Some("pay_456".to_string());

        let err = decide(&order, customer, "pay_999").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_cross_customer_completion_forbidden() {
        let owner = Uuid::new_v4();
        let order = pending_order(owner);

        let err = decide(&order, Uuid::new_v4(), "pay_456").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_cancelled_order_cannot_settle() {
        let customer = Uuid::new_v4();
        let mut order = pending_order(customer);
        order.status = OrderStatus::Cancelled;

        let err = decide(&order, customer, "pay_456").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
