//! Mapping of application errors onto HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fintrack_core::auth::PasswordError;
use fintrack_core::transaction::{StoreError, TransactionError};
use fintrack_shared::{AppError, FieldError, JwtError, ValidationErrors};
use tracing::error;

use crate::response::ApiResponse;

/// An [`AppError`] on its way out as an envelope.
///
/// Server-side failures are logged here and reach the client only as
/// `Server error`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_server_error() {
            error!(error = %self.0, code = self.0.error_code(), "request failed");
        }

        let message = self.0.client_message();
        let errors = match self.0 {
            AppError::Validation { errors, .. } => errors.into_inner(),
            _ => Vec::new(),
        };
        (status, Json(ApiResponse::error(message, errors))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<TransactionError> for ApiError {
    fn from(err: TransactionError) -> Self {
        Self(err.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self(err.into())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self(AppError::validation(errors))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::EncodingError(msg) => Self(AppError::Internal(msg)),
            JwtError::DecodingError(_) | JwtError::Expired => {
                Self(AppError::Unauthorized("Invalid or expired token".to_string()))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let errors = ValidationErrors::from(FieldError::new("body", rejection.body_text()));
        Self(AppError::Validation {
            message: "Invalid request body".to_string(),
            errors,
        })
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let errors = ValidationErrors::from(FieldError::new("query", rejection.body_text()));
        Self(AppError::Validation {
            message: "Invalid query string".to_string(),
            errors,
        })
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
