//! HTTP response handling for errors

use super::types::GatewayError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

impl GatewayError {
    /// Status, stable code and client-safe message
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            GatewayError::Denied(reason) => (
                StatusCode::from_u16(reason.http_status()).unwrap_or(StatusCode::FORBIDDEN),
                reason.code(),
                reason.message(),
            ),
            GatewayError::DatastoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "DATASTORE_UNAVAILABLE",
                "Authorization data is temporarily unavailable".to_string(),
            ),
            GatewayError::Jwt(_) => (
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_REQUIRED",
                "Invalid or expired token".to_string(),
            ),
            GatewayError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            GatewayError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", self.to_string())
            }
            GatewayError::Serialization(_) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                "Malformed request body".to_string(),
            ),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            GatewayError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Database operation failed".to_string(),
            ),
            GatewayError::Config(_)
            | GatewayError::Yaml(_)
            | GatewayError::Io(_)
            | GatewayError::Migration(_)
            | GatewayError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        }
    }

    /// Response body, without the request id
    pub fn to_response_body(&self) -> ErrorResponse {
        self.to_response_body_for(None)
    }

    /// Response body carrying the id of the failed request
    pub fn to_response_body_for(&self, request_id: Option<String>) -> ErrorResponse {
        let (_, code, message) = self.parts();
        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
                request_id,
                details: self
                    .deny_reason()
                    .and_then(|reason| serde_json::to_value(reason).ok()),
            },
        }
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        self.parts().0
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_response_body())
    }
}

/// Standard error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Structured denial, present for authorization failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
