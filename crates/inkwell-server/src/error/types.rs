//! API error types.

use axum::http::StatusCode;
use inkwell_import::SourceReadError;
use inkwell_policy::Denied;
use std::collections::HashMap;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a handler can surface.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 401 Unauthorized
    #[error("Unauthenticated.")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has been revoked")]
    TokenRevoked,

    // 403 Forbidden, or 422 for the age gate
    #[error("{0}")]
    Denied(#[from] Denied),

    // 404 Not Found
    #[error("{0} not found")]
    NotFound(&'static str),

    // 409 Conflict
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    // 413 Payload Too Large
    #[error("{0}")]
    PayloadTooLarge(String),

    // 422 Unprocessable Entity
    #[error("Validation error")]
    Validation(HashMap<String, Vec<String>>),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Unable to read import file: {0}")]
    ImportSource(#[from] SourceReadError),

    // 500 Internal Server Error
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error("Database error")]
    Database(#[source] sqlx::Error),

    // 503 Service Unavailable
    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl ApiError {
    /// Single-field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = HashMap::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self::Validation(fields)
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,

            Self::Unauthorized
            | Self::InvalidCredentials
            | Self::IncorrectPassword
            | Self::TokenExpired
            | Self::InvalidToken
            | Self::TokenRevoked => StatusCode::UNAUTHORIZED,

            Self::Denied(Denied::Underage { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Denied(Denied::MissingPermission { .. }) => StatusCode::FORBIDDEN,

            Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::DuplicateEntry(_) => StatusCode::CONFLICT,

            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,

            Self::Validation(_) | Self::Unprocessable(_) | Self::ImportSource(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            Self::Internal(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,

            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::InvalidCredentials => "invalid_credentials",
            Self::IncorrectPassword => "incorrect_password",
            Self::TokenExpired => "token_expired",
            Self::InvalidToken => "invalid_token",
            Self::TokenRevoked => "token_revoked",
            Self::Denied(Denied::Underage { .. }) => "underage",
            Self::Denied(Denied::MissingPermission { .. }) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::DuplicateEntry(_) => "duplicate_entry",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Validation(_) => "validation_error",
            Self::Unprocessable(_) => "unprocessable_entity",
            Self::ImportSource(_) => "import_source_error",
            Self::Internal(_) => "internal_error",
            Self::Database(_) => "database_error",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }

    /// Check if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}
