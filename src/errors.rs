use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::workflow::OrderStatus;

/// JSON error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional error details (validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Cannot transition from status '{from}' to '{to}'")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Derived status '{derived}' is not a legal transition from current status '{current}'")]
    InconsistentDerivedStatus {
        current: OrderStatus,
        derived: OrderStatus,
    },

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_)
            | Self::InvalidTransition { .. }
            | Self::InvalidStatus(_)
            | Self::InvalidOperation(_)
            | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::InconsistentDerivedStatus { .. } | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_) | Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message suitable for HTTP responses. Internal errors return generic
    /// messages instead of leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidTransition {
                from: OrderStatus::Received,
                to: OrderStatus::Stitching
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InconsistentDerivedStatus {
                current: OrderStatus::Ready,
                derived: OrderStatus::Cutting
            }
            .status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn invalid_transition_message_names_both_statuses() {
        let err = ServiceError::InvalidTransition {
            from: OrderStatus::Received,
            to: OrderStatus::Stitching,
        };
        let msg = err.to_string();
        assert!(msg.contains("received"));
        assert!(msg.contains("stitching"));
    }

    #[test]
    fn internal_details_are_hidden_from_responses() {
        assert_eq!(
            ServiceError::InternalError("connection string leaked".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::NotFound("Order not found".into()).response_message(),
            "Not found: Order not found"
        );
    }

    #[tokio::test]
    async fn error_response_serializes_status_category() {
        let response = ServiceError::NotFound("missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.error, "Not Found");
        assert_eq!(payload.message, "Not found: missing");
    }
}
