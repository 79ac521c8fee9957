use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kinboard_core::AppError;
use tracing::error;

mod types;

use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    /// Status code for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_)
            | AppError::TokenInvalid(_)
            | AppError::TokenExpired
            | AppError::MissingClaims(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Delivery(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self.0 {
            AppError::Internal(ref detail) => {
                error!(error = %detail, "request failed with internal error");
                "internal server error".to_owned()
            }
            AppError::Delivery(ref detail) => {
                error!(error = %detail, "request failed with delivery error");
                "email could not be delivered".to_owned()
            }
            ref other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
