//! Error response implementation.

use super::types::ApiError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use inkwell_domain::PasswordError;
use crate::export::ExportError;
use crate::storage::StorageError;
use inkwell_import::StoreError;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, warn};

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(
                error = %self,
                source = ?std::error::Error::source(&self),
                code = self.error_code(),
                "Server error occurred"
            );
        } else if matches!(
            self,
            ApiError::Unauthorized
                | ApiError::InvalidCredentials
                | ApiError::TokenRevoked
                | ApiError::Denied(_)
        ) {
            warn!(error = %self, code = self.error_code(), "Auth error occurred");
        }

        let status = self.status_code();
        let code = self.error_code();

        let (message, details, fields) = match &self {
            ApiError::Validation(fields) => (self.to_string(), None, Some(fields.clone())),
            ApiError::Denied(denied) => {
                let details = serde_json::to_value(DeniedDetails::from(denied)).ok();
                (self.to_string(), details, None)
            }
            ApiError::Internal(err) => {
                let message = if cfg!(debug_assertions) {
                    format!("{}: {}", self, err)
                } else {
                    "An internal error occurred".to_string()
                };
                (message, None, None)
            }
            ApiError::Database(err) => {
                let message = if cfg!(debug_assertions) {
                    format!("Database error: {}", err)
                } else {
                    "A database error occurred".to_string()
                };
                (message, None, None)
            }
            _ => (self.to_string(), None, None),
        };

        let body = ErrorResponse {
            success: false,
            message,
            error: ErrorBody {
                code,
                details,
                fields,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct DeniedDetails {
    action: &'static str,
    resource: &'static str,
}

impl From<&inkwell_policy::Denied> for DeniedDetails {
    fn from(denied: &inkwell_policy::Denied) -> Self {
        match denied {
            inkwell_policy::Denied::Underage { resource, .. } => Self {
                action: "create",
                resource: resource.as_str(),
            },
            inkwell_policy::Denied::MissingPermission { action, resource, .. } => Self {
                action: action.as_str(),
                resource: resource.as_str(),
            },
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Record"),
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some("23505") {
                    return ApiError::DuplicateEntry(
                        db_err
                            .constraint()
                            .unwrap_or_else(|| db_err.message())
                            .to_string(),
                    );
                }
                ApiError::Database(err)
            }
            _ => ApiError::Database(err),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
            _ => ApiError::InvalidToken,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let field = field.to_string();
                let messages = errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("The {} field is invalid.", field.replace('_', " ")),
                    })
                    .collect();
                (field, messages)
            })
            .collect();
        ApiError::Validation(fields)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(anyhow::Error::new(err))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(constraint) => ApiError::DuplicateEntry(constraint),
            StoreError::MissingReference(what) => ApiError::Unprocessable(what),
            StoreError::Backend(message) => ApiError::Internal(anyhow::anyhow!(message)),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Database(e) => e.into(),
            other => ApiError::Internal(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = body_json(ApiError::NotFound("Post")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Post not found");
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let (status, body) =
            body_json(ApiError::field("title", "The title field is required.")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Validation error");
        assert_eq!(body["error"]["fields"]["title"][0], "The title field is required.");
    }

    #[tokio::test]
    async fn test_denied_body_carries_fixed_message() {
        let denied = inkwell_policy::Denied::MissingPermission {
            action: inkwell_policy::Action::Edit,
            resource: inkwell_policy::ResourceKind::Posts,
            ownership: inkwell_policy::Ownership::NotOwned,
        };
        let (status, body) = body_json(denied.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["message"],
            "Unauthorized. You do not have permission to edit this post."
        );
        assert_eq!(body["error"]["details"]["action"], "edit");
    }

    #[test]
    fn test_store_unique_violation_is_conflict() {
        let err = ApiError::from(StoreError::UniqueViolation("users_email_key".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
