//! API error handling

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_cash::CashError;
use domain_credit::CreditError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Request conflicts with the current state; `code` names which rule
    #[error("Conflict: {message}")]
    Conflict { code: &'static str, message: String },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ApiError {
    fn conflict(code: &'static str, message: impl ToString) -> Self {
        ApiError::Conflict {
            code,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg),
            ApiError::InvalidAmount(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_amount", msg),
            ApiError::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
            ApiError::Internal(msg) => {
                error!(%msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<CreditError> for ApiError {
    fn from(err: CreditError) -> Self {
        match err {
            CreditError::Validation(msg) => ApiError::Validation(msg),
            CreditError::Money(e) => ApiError::Validation(e.to_string()),
            e @ CreditError::InvalidAmount { .. } => ApiError::InvalidAmount(e.to_string()),
            e @ CreditError::AccountNotFound(_) => ApiError::NotFound(e.to_string()),
            e @ CreditError::AccountNotActive { .. } => ApiError::conflict("account_not_active", e),
            e @ CreditError::ConcurrentModification(_) => {
                ApiError::conflict("concurrent_modification", e)
            }
            CreditError::Dependency(e) if e.is_transient() => ApiError::ServiceUnavailable(e.to_string()),
            CreditError::Dependency(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CashError> for ApiError {
    fn from(err: CashError) -> Self {
        match err {
            CashError::Validation(msg) => ApiError::Validation(msg),
            e @ CashError::AlreadyOpen { .. } => ApiError::conflict("already_open", e),
            e @ CashError::NotOpen { .. } => ApiError::conflict("not_open", e),
            e @ CashError::DayAlreadyClosed { .. } => ApiError::conflict("day_closed", e),
            CashError::Dependency(e) if e.is_transient() => ApiError::ServiceUnavailable(e.to_string()),
            CashError::Dependency(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}
