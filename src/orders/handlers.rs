//! HTTP handlers for order operations
//!
//! Every success body carries `success: true`; failures go through
//! [`OrderError`]'s `IntoResponse`.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::OrderFilter;
use crate::core::auth::{AuthContext, Operation, resolve_context};
use crate::core::error::{OrderError, OrderResult};
use crate::core::order::{Order, OrderStatus};
use crate::core::store::OrderStats;
use crate::core::validation::OrderInput;
use crate::server::host::ServerHost;

/// Shared state for every order route
pub type AppState = Arc<ServerHost>;

impl ServerHost {
    /// Resolve the caller and check the operation's policy
    pub async fn authorize(&self, op: Operation, headers: &HeaderMap) -> OrderResult<AuthContext> {
        let context = resolve_context(self.identity.as_ref(), headers).await?;
        self.policies.enforce(op, &context)?;
        Ok(context)
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct ListOrdersResponse {
    pub success: bool,
    pub count: usize,
    pub orders: Vec<Order>,
}

impl ListOrdersResponse {
    fn new(orders: Vec<Order>) -> Self {
        Self {
            success: true,
            count: orders.len(),
            orders,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: OrderStats,
}

/// Body for PATCH /orders/{orderId}/status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn invalid_body(rejection: JsonRejection) -> OrderError {
    OrderError::InvalidBody {
        message: rejection.body_text(),
    }
}

/// POST /api/orders
pub async fn place_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<OrderInput>, JsonRejection>,
) -> OrderResult<impl IntoResponse> {
    let context = state.authorize(Operation::PlaceOrder, &headers).await?;
    let Json(input) = body.map_err(invalid_body)?;

    let order = state.orders.place_order(&input, &context).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            message: Some("Order placed successfully! Check your email for confirmation.".to_string()),
            order,
        }),
    ))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> OrderResult<Json<ListOrdersResponse>> {
    state.authorize(Operation::ListOrders, &headers).await?;
    let orders = state.orders.list_orders(&OrderFilter::default()).await?;
    Ok(Json(ListOrdersResponse::new(orders)))
}

/// GET /api/orders/{orderId}
pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> OrderResult<Json<OrderResponse>> {
    state.authorize(Operation::GetOrder, &headers).await?;
    let order = state.orders.get_order(&order_id).await?;
    Ok(Json(OrderResponse {
        success: true,
        message: None,
        order,
    }))
}

/// GET /api/orders/status/{status}
pub async fn orders_by_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_status): Path<String>,
) -> OrderResult<Json<ListOrdersResponse>> {
    state.authorize(Operation::OrdersByStatus, &headers).await?;
    let status: OrderStatus = raw_status
        .parse()
        .map_err(|value| OrderError::InvalidStatus { value })?;
    let orders = state.orders.list_orders(&OrderFilter::by_status(status)).await?;
    Ok(Json(ListOrdersResponse::new(orders)))
}

/// GET /api/orders/my-orders
pub async fn my_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> OrderResult<Json<ListOrdersResponse>> {
    let context = state.authorize(Operation::MyOrders, &headers).await?;
    let user_id = context.user_id().ok_or_else(|| OrderError::Unauthorized {
        message: "authentication required".to_string(),
    })?;
    let orders = state.orders.list_orders(&OrderFilter::by_owner(user_id)).await?;
    Ok(Json(ListOrdersResponse::new(orders)))
}

/// PATCH /api/orders/{orderId}/status
pub async fn update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> OrderResult<Json<OrderResponse>> {
    let context = state.authorize(Operation::UpdateStatus, &headers).await?;
    let Json(request) = body.map_err(invalid_body)?;

    let order = state
        .orders
        .update_status(&order_id, &request.status, &context)
        .await?;
    Ok(Json(OrderResponse {
        success: true,
        message: Some("Order status updated".to_string()),
        order,
    }))
}

/// DELETE /api/orders/{orderId}
pub async fn delete_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> OrderResult<Json<MessageResponse>> {
    state.authorize(Operation::DeleteOrder, &headers).await?;
    state.orders.delete_order(&order_id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Order deleted successfully".to_string(),
    }))
}

/// GET /api/stats
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> OrderResult<Json<StatsResponse>> {
    state.authorize(Operation::Stats, &headers).await?;
    let stats = state.orders.stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}
