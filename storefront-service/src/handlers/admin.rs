//! Admin-side order listing and status mutation.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use site_core::error::AppError;
use site_core::utils::ValidatedJson;
use uuid::Uuid;

use crate::{
    dtos::admin::{ListOrdersQuery, OrderListResponse, UpdateOrderStatusRequest},
    dtos::orders::OrderResponse,
    middleware::AdminContext,
    models::OrderStatus,
    AppState,
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

pub async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminContext,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<OrderListResponse>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let (orders, total) = state
        .repository
        .list_orders(query.status, limit, offset)
        .await?;

    Ok(Json(OrderListResponse {
        orders: orders.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Advance an order's lifecycle. `Paid` is never settable here: that
/// transition belongs exclusively to payment verification.
pub async fn update_order_status(
    State(state): State<AppState>,
    admin: AdminContext,
    Path(order_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    if req.status == OrderStatus::Paid {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Only payment verification can mark an order paid"
        )));
    }

    let order = state
        .repository
        .find_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Order not found")))?;

    if !order.status.admin_can_transition(req.status) {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Cannot transition order from {:?} to {:?}",
            order.status,
            req.status
        )));
    }

    // Conditional on the status the operator saw, so two concurrent admin
    // edits cannot both apply.
    let applied = state
        .repository
        .update_order_status(order_id, order.status, req.status, req.admin_notes.as_deref())
        .await
        .map_err(AppError::InternalError)?;

    if !applied {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Order changed concurrently, please retry"
        )));
    }

    tracing::info!(
        order_id = %order_id,
        admin = %admin.email,
        from = ?order.status,
        to = ?req.status,
        "Order status updated"
    );

    let updated = state
        .repository
        .find_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Order not found")))?;

    Ok(Json(updated.into()))
}
