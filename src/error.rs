//! HTTP-facing error taxonomy.
//!
//! Lower layers have their own error types; they are converted here so handlers
//! can use `?`. Internal failures are logged in full and answered generically.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::password::HashError;
use crate::auth::repository::RepositoryError;
use crate::auth::token::TokenError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    WeakPassword(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired session")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body: `{"error": ..., "code": ...}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::WeakPassword(_) | AuthError::DuplicateEmail => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Repository(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::WeakPassword(_) => "WEAK_PASSWORD",
            AuthError::DuplicateEmail => "DUPLICATE_EMAIL",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::Repository(_) | AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: self.code(),
            }),
        )
            .into_response()
    }
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateEmail => AuthError::DuplicateEmail,
            other => AuthError::Repository(other),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::InvalidSignature => AuthError::Forbidden,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        // Parser text stays in the log
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AuthError::Validation("Invalid request body".to_string())
    }
}

impl From<HashError> for AuthError {
    fn from(err: HashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
