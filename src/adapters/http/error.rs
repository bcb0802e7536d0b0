//! API error type mapping domain errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::DomainError;
use crate::domain::withdrawal::WithdrawalError;

/// JSON error body with a stable machine-readable code.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// API error wrapper converting domain errors to HTTP responses.
pub struct ApiError(WithdrawalError);

impl From<WithdrawalError> for ApiError {
    fn from(err: WithdrawalError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(WithdrawalError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            WithdrawalError::TaskNotFound(_) | WithdrawalError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            WithdrawalError::AlreadyRequested(_)
            | WithdrawalError::NotWithdrawable { .. }
            | WithdrawalError::InvalidState { .. } => StatusCode::CONFLICT,
            WithdrawalError::Unauthorized(_) => StatusCode::FORBIDDEN,
            WithdrawalError::ValidationFailed { .. }
            | WithdrawalError::InvalidReference(_)
            | WithdrawalError::InsufficientBalance(_) => StatusCode::BAD_REQUEST,
            WithdrawalError::SignatureRejected { .. } => StatusCode::UNAUTHORIZED,
            WithdrawalError::Gateway { .. } => StatusCode::BAD_GATEWAY,
            WithdrawalError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}
