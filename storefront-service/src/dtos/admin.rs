use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dtos::orders::OrderResponse;
use crate::models::OrderStatus;

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,

    #[validate(length(max = 2000, message = "Notes too long"))]
    pub admin_notes: Option<String>,
}
