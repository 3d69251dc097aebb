//! Typed error handling for the order engine
//!
//! Errors are grouped the same way clients need to react to them:
//!
//! - [`OrderError`]: everything the HTTP layer can return, with a status code,
//!   a stable error code and a JSON body
//! - [`StoreError`]: failures reported by an [`OrderStore`](crate::core::store::OrderStore)
//! - [`NotifyError`]: notification failures, which are logged and never
//!   returned to a client
//!
//! # Example
//!
//! ```rust,ignore
//! match service.get_order("ORDER-1").await {
//!     Ok(order) => println!("{}", order.status),
//!     Err(OrderError::NotFound { order_id }) => println!("{} is gone", order_id),
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::core::order::OrderStatus;

/// A single field validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The main error type returned by the lifecycle service and the HTTP layer
#[derive(Debug, Error)]
pub enum OrderError {
    /// One or more fields failed validation; all reasons are kept
    #[error("Validation failed: {}", join_reasons(.0))]
    Validation(Vec<FieldValidationError>),

    /// The request body could not be decoded
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// A status value outside the lifecycle enum
    #[error("Invalid status '{value}'. Expected one of: Pending, Preparing, Ready, Completed, Cancelled")]
    InvalidStatus { value: String },

    /// The configured transition policy forbids this move
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order '{order_id}' not found")]
    NotFound { order_id: String },

    /// The order kept changing underneath a status update
    #[error("Order '{order_id}' was modified concurrently, please retry")]
    Conflict { order_id: String },

    #[error("Not authorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Order id generation kept colliding with existing orders
    #[error("Could not allocate a unique order id, please retry")]
    IdCollision,

    /// The persistence layer failed; details are logged, not returned
    #[error("Order storage is unavailable")]
    StoreUnavailable,
}

fn join_reasons(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error response body
///
/// Mirrors the success envelope: `{ "success": false, "code", "message", "errors"? }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Field-level reasons, only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldValidationError>>,
}

impl OrderError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            OrderError::InvalidStatus { .. } => StatusCode::BAD_REQUEST,
            OrderError::InvalidTransition { .. } => StatusCode::CONFLICT,
            OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::Conflict { .. } => StatusCode::CONFLICT,
            OrderError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            OrderError::Forbidden { .. } => StatusCode::FORBIDDEN,
            OrderError::IdCollision => StatusCode::SERVICE_UNAVAILABLE,
            OrderError::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "VALIDATION_ERROR",
            OrderError::InvalidBody { .. } => "INVALID_BODY",
            OrderError::InvalidStatus { .. } => "INVALID_STATUS",
            OrderError::InvalidTransition { .. } => "INVALID_TRANSITION",
            OrderError::NotFound { .. } => "ORDER_NOT_FOUND",
            OrderError::Conflict { .. } => "ORDER_CONFLICT",
            OrderError::Unauthorized { .. } => "UNAUTHORIZED",
            OrderError::Forbidden { .. } => "FORBIDDEN",
            OrderError::IdCollision => "ORDER_ID_COLLISION",
            OrderError::StoreUnavailable => "STORE_UNAVAILABLE",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            code: self.error_code().to_string(),
            message: self.to_string(),
            errors: match self {
                OrderError::Validation(errors) => Some(errors.clone()),
                _ => None,
            },
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { order_id } => OrderError::NotFound { order_id },
            StoreError::DuplicateKey { .. } => OrderError::IdCollision,
            StoreError::StatusConflict { order_id, .. } => OrderError::Conflict { order_id },
            StoreError::Unavailable { backend, message } => {
                tracing::error!(backend = %backend, error = %message, "order store failure");
                OrderError::StoreUnavailable
            }
        }
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors reported by storage backends
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The external order id is already taken
    #[error("Order id '{order_id}' already exists")]
    DuplicateKey { order_id: String },

    #[error("Order '{order_id}' not found")]
    NotFound { order_id: String },

    /// A compare-and-set write found a different status than expected
    #[error("Order '{order_id}' is now {actual}")]
    StatusConflict { order_id: String, actual: OrderStatus },

    /// Backend unreachable or the operation failed mid-flight
    #[error("{backend} storage error: {message}")]
    Unavailable { backend: String, message: String },
}

impl StoreError {
    pub fn unavailable(backend: &str, message: impl ToString) -> Self {
        StoreError::Unavailable {
            backend: backend.to_string(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Notification Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification provider rejected the message: {0}")]
    Rejected(String),

    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// A specialized Result type for order operations
pub type OrderResult<T> = Result<T, OrderError>;

/// A specialized Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_and_status() {
        let err = OrderError::NotFound {
            order_id: "ORDER-1".to_string(),
        };
        assert!(err.to_string().contains("ORDER-1"));
        assert!(err.to_string().contains("not found"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "ORDER_NOT_FOUND");
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = OrderError::Validation(vec![
            FieldValidationError::new("customerName", "Customer name is required"),
            FieldValidationError::new("phone", "Invalid phone number"),
        ]);
        let display = err.to_string();
        assert!(display.contains("customerName"));
        assert!(display.contains("phone"));

        let response = err.to_response();
        assert!(!response.success);
        assert_eq!(response.errors.map(|e| e.len()), Some(2));
    }

    #[test]
    fn test_store_error_conversion() {
        let err: OrderError = StoreError::NotFound {
            order_id: "ORDER-9".to_string(),
        }
        .into();
        assert!(matches!(err, OrderError::NotFound { ref order_id } if order_id == "ORDER-9"));

        let err: OrderError = StoreError::unavailable("MongoDB", "connection refused").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        // Backend detail is not leaked to the client
        assert!(!err.to_string().contains("connection refused"));

        let err: OrderError = StoreError::DuplicateKey {
            order_id: "ORDER-1".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_transition_error_is_conflict() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Pending,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("Completed"));
    }

    #[test]
    fn test_error_response_serialization() {
        let err = OrderError::InvalidStatus {
            value: "Shipped".to_string(),
        };
        let json = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INVALID_STATUS");
        assert!(json.get("errors").is_none());
    }
}
