use axum::{
    http::{
        header::{RETRY_AFTER, WWW_AUTHENTICATE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::resume::ResumeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Resume(#[from] ResumeError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Could not validate credentials".to_string(),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Rate limit exceeded".to_string(),
            ),
            AppError::Auth(e) => match e {
                AuthError::InvalidSignature => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_TOKEN",
                    "Token expired or invalid".to_string(),
                ),
                AuthError::MissingClaims(_) => {
                    (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", e.to_string())
                }
                AuthError::Revoked => (
                    StatusCode::UNAUTHORIZED,
                    "TOKEN_REVOKED",
                    "Token already used or revoked".to_string(),
                ),
                AuthError::WrongTokenType { .. } => {
                    (StatusCode::FORBIDDEN, "WRONG_TOKEN_TYPE", e.to_string())
                }
                AuthError::WeakPassword(_) => {
                    (StatusCode::BAD_REQUEST, "WEAK_PASSWORD", e.to_string())
                }
                AuthError::Storage(_) | AuthError::Hashing(_) | AuthError::InvalidKey(_) => {
                    tracing::error!("Auth backend error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "AUTH_ERROR",
                        "An authentication backend error occurred".to_string(),
                    )
                }
            },
            AppError::Resume(e) => match e {
                ResumeError::Empty | ResumeError::MissingFilename => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                ResumeError::UnsupportedFormat(_) | ResumeError::NoText => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "UNPROCESSABLE_ENTITY",
                    e.to_string(),
                ),
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
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
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        if let AppError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
