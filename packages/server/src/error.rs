use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable error description.
    #[schema(example = "Storage quota exceeded")]
    pub error: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// Missing or garbled `Authorization` header.
    Unauthenticated,
    /// The identity provider rejected the token.
    InvalidCredential,
    /// Authenticated user with no associated account.
    TenantNotFound,
    /// Upload would push the tenant past its storage ceiling.
    QuotaExceeded,
    /// The file exists but belongs to another tenant.
    Forbidden,
    Validation(String),
    /// MIME type outside the category's allow-list.
    UnsupportedMediaType(String),
    NotFound(String),
    MethodNotAllowed,
    /// Usage or quota policy could not be read; never admit on a failed check.
    QuotaLookupFailed(String),
    /// Object store transport failure.
    StoreUnavailable(String),
    /// Metadata row write or delete failed.
    PersistenceError(String),
    Internal(String),
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication required".into())
            }
            AppError::InvalidCredential => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token".into())
            }
            AppError::TenantNotFound => (
                StatusCode::UNAUTHORIZED,
                "No account associated with this user".into(),
            ),
            AppError::QuotaExceeded => (StatusCode::FORBIDDEN, "Storage quota exceeded".into()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have access to this file".into(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UnsupportedMediaType(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".into())
            }
            AppError::QuotaLookupFailed(detail) => {
                tracing::error!("Quota lookup failed: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to check storage quota".into(),
                )
            }
            AppError::StoreUnavailable(detail) => {
                tracing::error!("Object store unavailable: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File storage is temporarily unavailable".into(),
                )
            }
            AppError::PersistenceError(detail) => {
                tracing::error!("Metadata persistence failed: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to record file metadata".into(),
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".into(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {key}")),
            other => AppError::StoreUnavailable(other.to_string()),
        }
    }
}
