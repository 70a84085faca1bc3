//! Gateway webhook handler.
//!
//! The webhook is the gateway's own replay channel for payment events and
//! may race the client-side verification call; both funnel into the same
//! conditional `Pending -> Paid` update, so whichever lands second no-ops.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use site_core::error::AppError;

use crate::{services::metrics, AppState};

pub const GATEWAY_SIGNATURE_HEADER: &str = "X-Gateway-Signature";

pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, AppError> {
    let signature = headers
        .get(GATEWAY_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing gateway webhook signature header");
            AppError::AuthError(anyhow::anyhow!("Missing webhook signature"))
        })?;

    let is_valid = state.gateway.verify_webhook(&body, signature).map_err(|e| {
        tracing::error!(error = %e, "Webhook signature verification error");
        AppError::InternalError(anyhow::anyhow!("Webhook verification failed"))
    })?;

    if !is_valid {
        return Err(AppError::SignatureInvalid);
    }

    let event = state.gateway.parse_webhook_event(&body).map_err(|e| {
        tracing::error!(error = %e, "Failed to parse webhook event");
        AppError::BadRequest(anyhow::anyhow!("Invalid webhook payload"))
    })?;

    tracing::info!(event_type = %event.event, "Processing gateway webhook");

    match event.event.as_str() {
        "payment.captured" => {
            if let Some(ref payment_entity) = event.payload.payment {
                let payment = &payment_entity.entity;
                if let Some(ref gateway_order_id) = payment.order_id {
                    settle_from_webhook(&state, gateway_order_id, Some(&payment.id)).await;
                }
            }
        }
        "order.paid" => {
            // Payment id is only present when the payment entity rides along.
            let payment_id = event
                .payload
                .payment
                .as_ref()
                .map(|p| p.entity.id.clone());
            if let Some(ref order_entity) = event.payload.order {
                settle_from_webhook(&state, &order_entity.entity.id, payment_id.as_deref()).await;
            }
        }
        _ => {
            tracing::debug!(event_type = %event.event, "Unhandled webhook event type");
        }
    }

    // Acknowledge receipt so the gateway stops retrying.
    Ok(StatusCode::OK)
}

async fn settle_from_webhook(
    state: &AppState,
    gateway_order_id: &str,
    gateway_payment_id: Option<&str>,
) {
    match state
        .repository
        .mark_paid_by_gateway_id(gateway_order_id, gateway_payment_id)
        .await
    {
        Ok(true) => {
            metrics::record_settlement("paid");
            tracing::info!(
                gateway_order_id = %gateway_order_id,
                "Order settled via webhook"
            );
        }
        Ok(false) => {
            // Already settled (client verification won) or unknown order id.
            tracing::debug!(
                gateway_order_id = %gateway_order_id,
                "Webhook settlement was a no-op"
            );
        }
        Err(e) => {
            tracing::error!(
                gateway_order_id = %gateway_order_id,
                error = %e,
                "Failed to settle order from webhook"
            );
        }
    }
}
