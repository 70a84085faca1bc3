//! Order intent, payment verification and customer order queries.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::DateTime;
use site_core::error::AppError;
use site_core::utils::ValidatedJson;
use uuid::Uuid;

use crate::{
    dtos::orders::{
        CreateOrderRequest, CreateOrderResponse, OrderResponse, VerifyPaymentRequest,
        VerifyPaymentResponse,
    },
    middleware::CustomerContext,
    models::{Order, OrderStatus},
    services::gateway::CheckoutCallback,
    services::metrics,
    services::settlement::{self, Settlement},
    AppState,
};

use super::field_validation_error;

/// Create a pending order and open a payment intent with the gateway.
///
/// The amount is read from the service's published pricing at call time;
/// the request cannot carry an amount.
pub async fn create_order(
    State(state): State<AppState>,
    customer: CustomerContext,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let service = state
        .repository
        .find_service_by_slug(&req.service)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Service not found")))?;

    let amount = service
        .price_for(req.package)
        .ok_or_else(|| field_validation_error("package", "Unknown package tier for this service"))?;

    let now = DateTime::now();
    let order = Order {
        id: Uuid::new_v4(),
        reference: Order::new_reference(),
        customer_id: customer.customer_id,
        service_id: service.id,
        service_slug: service.slug.clone(),
        package: req.package,
        amount,
        currency: state.config.gateway.currency.clone(),
        status: OrderStatus::Pending,
        gateway_order_id: None,
        gateway_payment_id: None,
        requirements: req.requirements,
        admin_notes: None,
        created_at: now,
        updated_at: now,
    };

    // Persist first so an intent is never created for an unrecorded order.
    state
        .repository
        .create_order(order.clone())
        .await
        .map_err(AppError::InternalError)?;

    let intent = state
        .gateway
        .create_intent(amount, &order.currency, &order.reference)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, order_id = %order.id, "Failed to create payment intent");
            AppError::UpstreamUnavailable(e.to_string())
        })?;

    state
        .repository
        .set_gateway_order_id(order.id, &intent.id)
        .await
        .map_err(AppError::InternalError)?;

    metrics::record_order_created(&order.currency, amount);

    tracing::info!(
        order_id = %order.id,
        reference = %order.reference,
        gateway_order_id = %intent.id,
        amount,
        "Order created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order_id: order.id,
            reference: order.reference,
            gateway_order_id: intent.id,
            amount,
            currency: order.currency,
            key_id: state.gateway.key_id().to_string(),
        }),
    ))
}

/// Verify a checkout completion and settle the order.
///
/// The sole transition out of `Pending`; everything after the signature
/// check is idempotent against replays.
pub async fn verify_payment(
    State(state): State<AppState>,
    customer: CustomerContext,
    ValidatedJson(req): ValidatedJson<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    let callback = CheckoutCallback {
        gateway_order_id: req.gateway_order_id.clone(),
        gateway_payment_id: req.gateway_payment_id.clone(),
        signature: req.signature,
    };

    let is_valid = state.gateway.verify_checkout(&callback).map_err(|e| {
        tracing::error!(error = %e, "Signature verification error");
        AppError::InternalError(anyhow::anyhow!("Signature verification failed"))
    })?;

    if !is_valid {
        metrics::record_settlement("rejected");
        return Err(AppError::SignatureInvalid);
    }

    let order = state
        .repository
        .find_order_by_gateway_id(&req.gateway_order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Order not found")))?;

    match settlement::decide(&order, customer.customer_id, &req.gateway_payment_id)? {
        Settlement::AlreadyPaid => {
            metrics::record_settlement("replayed");
            Ok(Json(VerifyPaymentResponse {
                success: true,
                order_id: order.id,
                status: OrderStatus::Paid,
                message: "Payment already verified".to_string(),
            }))
        }
        Settlement::Transition => {
            let applied = state
                .repository
                .mark_paid(order.id, &req.gateway_payment_id)
                .await
                .map_err(AppError::InternalError)?;

            if !applied {
                // Lost a race against a concurrent verification or webhook;
                // re-read and let the decision logic classify the outcome.
                let current = state
                    .repository
                    .find_order_by_gateway_id(&req.gateway_order_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Order not found")))?;

                return match settlement::decide(
                    &current,
                    customer.customer_id,
                    &req.gateway_payment_id,
                )? {
                    Settlement::AlreadyPaid => {
                        metrics::record_settlement("replayed");
                        Ok(Json(VerifyPaymentResponse {
                            success: true,
                            order_id: current.id,
                            status: OrderStatus::Paid,
                            message: "Payment already verified".to_string(),
                        }))
                    }
                    Settlement::Transition => Err(AppError::InternalError(anyhow::anyhow!(
                        "Settlement update did not apply"
                    ))),
                };
            }

            metrics::record_settlement("paid");

            tracing::info!(
                order_id = %order.id,
                gateway_order_id = %req.gateway_order_id,
                gateway_payment_id = %req.gateway_payment_id,
                "Order settled"
            );

            Ok(Json(VerifyPaymentResponse {
                success: true,
                order_id: order.id,
                status: OrderStatus::Paid,
                message: "Payment verified successfully".to_string(),
            }))
        }
    }
}

/// List the caller's own orders, newest first.
pub async fn list_my_orders(
    State(state): State<AppState>,
    customer: CustomerContext,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state
        .repository
        .list_orders_for_customer(customer.customer_id)
        .await?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Fetch one of the caller's orders.
///
/// Absent and other-customer orders return the same `NotFound` so order ids
/// cannot be probed.
pub async fn get_order(
    State(state): State<AppState>,
    customer: CustomerContext,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .repository
        .find_order_for_customer(customer.customer_id, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Order not found")))?;

    Ok(Json(order.into()))
}
