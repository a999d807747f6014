use authz::Denial;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog::CatalogError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use user::UserError;

/// API error types, one per HTTP failure mode the service produces.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Invalid email or confirmation code")]
    InvalidCredentials,

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Method not allowed on this resource")]
    MethodNotAllowed,

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure for OpenAPI documentation
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for the error type
    pub fn error_code(&self) -> &str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            ApiError::Validation { field, .. } => Some(json!({ "field": field })),
            _ => None,
        };
        let error_response = ApiErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => ApiError::Unauthorized,
            Denial::Forbidden => ApiError::Forbidden,
            Denial::MethodNotAllowed => ApiError::MethodNotAllowed,
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Database(e) => ApiError::Database(e.to_string()),
            UserError::AccountNotFound(what) => ApiError::NotFound(what),
            UserError::InvalidCredentials => ApiError::InvalidCredentials,
            // A token that fails verification is missing credentials, not
            // a server fault.
            UserError::Token(_) => ApiError::Unauthorized,
            UserError::Configuration(msg) => ApiError::Internal(msg),
            UserError::Mail(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Database(e) => ApiError::Database(e.to_string()),
            CatalogError::NotFound(what) => ApiError::NotFound(what),
            CatalogError::SlugTaken(_) => {
                ApiError::validation("slug", "This slug already exists")
            }
            CatalogError::DuplicateReview => {
                ApiError::Conflict("You can write only one review per title".to_string())
            }
            CatalogError::Validation { field, message } => ApiError::Validation { field, message },
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
