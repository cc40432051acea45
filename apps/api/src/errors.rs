use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::EditError;
use crate::export::ExportError;
use crate::identity::AuthError;
use crate::session::SessionError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::SignedOut => AppError::Auth(AuthError::MissingToken),
            SessionError::Store(e) => AppError::Store(e),
            SessionError::Edit(e) => AppError::Edit(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Auth(e) => auth_status(e),
            AppError::Edit(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EDIT_REJECTED",
                e.to_string(),
            ),
            AppError::Store(StoreError::NotFound) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resume not found".to_string(),
            ),
            AppError::Store(StoreError::PermissionDenied) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Export(e @ (ExportError::Capture(_) | ExportError::EmptyCapture)) => (
                StatusCode::BAD_REQUEST,
                "CAPTURE_REJECTED",
                e.to_string(),
            ),
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "Exporting the PDF failed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn auth_status(e: &AuthError) -> (StatusCode, &'static str, String) {
    match e {
        AuthError::MissingToken | AuthError::InvalidToken => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string())
        }
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", e.to_string()),
        AuthError::EmailInUse => (StatusCode::CONFLICT, "EMAIL_IN_USE", e.to_string()),
        AuthError::TooManyAttempts => (StatusCode::TOO_MANY_REQUESTS, "TOO_MANY_ATTEMPTS", e.to_string()),
        AuthError::ProviderCancelled | AuthError::ProviderFailed(_) => {
            (StatusCode::UNAUTHORIZED, "PROVIDER_SIGN_IN_FAILED", e.to_string())
        }
        AuthError::WeakPassword | AuthError::InvalidEmail | AuthError::PasswordMismatch => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
        }
        AuthError::Network(_) | AuthError::Rejected(_) => {
            tracing::error!("Identity service error: {e}");
            (
                StatusCode::BAD_GATEWAY,
                "IDENTITY_UNAVAILABLE",
                "The identity service could not complete the request".to_string(),
            )
        }
    }
}
