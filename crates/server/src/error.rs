//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers and resource services
//! return `Result<T, AppError>`.
//!
//! # Response bodies
//!
//! - 400: `{"field": ["message", ...], "non_field_errors": [...]}`
//! - 401/403/404: `{"detail": "..."}`
//! - 500: `{"detail": "A server error occurred."}`

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::validation::{NON_FIELD_ERRORS, ValidationErrors};

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const INVALID_TOKEN: &str = "Invalid token.";
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
pub const NOT_FOUND: &str = "Not found.";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Request payload or query failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed to act on the object.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found, or not visible to the caller.
    #[error("Not found")]
    NotFound,
}

impl AppError {
    /// 401 for a request without credentials.
    #[must_use]
    pub fn not_authenticated() -> Self {
        Self::Unauthorized(NOT_AUTHENTICATED.to_owned())
    }

    /// 403 with the standard message.
    #[must_use]
    pub fn permission_denied() -> Self {
        Self::Forbidden(PERMISSION_DENIED.to_owned())
    }

    /// 400 with a message that belongs to no particular field.
    #[must_use]
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::non_field(message))
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::Invalid(_)
                | AuthError::InvalidCredentials
                | AuthError::UserAlreadyExists => StatusCode::BAD_REQUEST,
                AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(errors) => json!(errors),
            Self::Auth(err) => match err {
                AuthError::Invalid(errors) => json!(errors),
                AuthError::InvalidCredentials => json!({
                    NON_FIELD_ERRORS: ["Unable to log in with provided credentials."]
                }),
                AuthError::UserAlreadyExists => json!({
                    "username": ["A user with that username already exists."]
                }),
                AuthError::InvalidToken => json!({ "detail": INVALID_TOKEN }),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    json!({ "detail": "A server error occurred." })
                }
            },
            Self::Unauthorized(detail) | Self::Forbidden(detail) => json!({ "detail": detail }),
            Self::NotFound => json!({ "detail": NOT_FOUND }),
            Self::Database(_) => json!({ "detail": "A server error occurred." }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::non_field(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::non_field(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        // `/pets/abc` names no object
        Self::NotFound
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}
