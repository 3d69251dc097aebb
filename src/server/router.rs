//! Route table

use axum::{
    Json, Router,
    extract::{FromRef, Request, State},
    http::{StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::catalog::{self, Catalog};
use crate::core::error::ErrorResponse;
use crate::orders::handlers::{
    AppState, delete_order, get_order, list_orders, my_orders, orders_by_status, place_order,
    stats, update_status,
};
use crate::server::host::ServerHost;

impl FromRef<Arc<ServerHost>> for Catalog {
    fn from_ref(host: &Arc<ServerHost>) -> Self {
        host.catalog.clone()
    }
}

/// Build all routes
///
/// - POST/GET /api/orders
/// - GET /api/orders/my-orders
/// - GET /api/orders/status/{status}
/// - GET/DELETE /api/orders/{order_id}
/// - PATCH /api/orders/{order_id}/status
/// - GET /api/stats
/// - GET /api/cakes
/// - GET /health
pub fn build_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/orders", get(list_orders).post(place_order))
        .route("/orders/my-orders", get(my_orders))
        .route("/orders/status/{status}", get(orders_by_status))
        .route("/orders/{order_id}", get(get_order).delete(delete_order))
        .route(
            "/orders/{order_id}/status",
            axum::routing::patch(update_status),
        )
        .route("/stats", get(stats))
        .route("/cakes", get(catalog::list_cakes));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health_check))
        .fallback(route_not_found)
        .with_state(state)
}

fn error_body(status: StatusCode, code: &str, message: String) -> Response {
    let body = ErrorResponse {
        success: false,
        code: code.to_string(),
        message,
        errors: None,
    };
    (status, Json(body)).into_response()
}

async fn route_not_found(uri: Uri) -> Response {
    error_body(
        StatusCode::NOT_FOUND,
        "ROUTE_NOT_FOUND",
        format!("No route for {}", uri.path()),
    )
}

/// Middleware giving framework-generated errors the JSON error body
///
/// Must sit outside the timeout layer so a 408 is rewritten too.
pub async fn json_error_envelope(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    into_error_envelope(response)
}

/// Rewrite a bodiless or plain-text error response; JSON responses pass through
pub fn into_error_envelope(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let code = match status {
        StatusCode::NOT_FOUND => "ROUTE_NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::REQUEST_TIMEOUT => "REQUEST_TIMEOUT",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        _ => "HTTP_ERROR",
    };
    let message = status.canonical_reason().unwrap_or("Request failed").to_string();

    let mut wrapped = error_body(status, code, message);
    if let Some(allow) = response.headers().get(header::ALLOW) {
        wrapped.headers_mut().insert(header::ALLOW, allow.clone());
    }
    wrapped
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// Health check endpoint handler
///
/// 503 when the store does not answer a ping.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, label) = match state.orders.store().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e, "health check: store unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        status,
        Json(json!({
            "status": label,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "storage": state.storage_backend(),
            "uptimeSeconds": state.uptime_seconds(),
        })),
    )
}
