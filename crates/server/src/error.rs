//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::admin::AdminError;
use crate::services::auth::AuthError;
use crate::services::bookings::BookingError;
use crate::store::StoreError;

/// Application-level error type for the calendar server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Booking operation failed.
    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    /// Administrative operation failed.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed to do this.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Repository(_) | Self::Store(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Repository(_) | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => StatusCode::UNAUTHORIZED,
                AuthError::NotOnAccessList => StatusCode::FORBIDDEN,
                AuthError::AlreadyRegistered => StatusCode::CONFLICT,
                AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::Session(_) | AuthError::PasswordHash(_) | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Booking(err) => match err {
                BookingError::Forbidden(_) => StatusCode::FORBIDDEN,
                BookingError::OutOfYear { .. } | BookingError::UnknownUser(_) => {
                    StatusCode::BAD_REQUEST
                }
                BookingError::ConfirmationRequired(_) => StatusCode::CONFLICT,
                BookingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Admin(err) => match err {
                AdminError::ConfirmationRequired(_) => StatusCode::CONFLICT,
                AdminError::UnknownUser(_) | AdminError::RangeOutOfYear { .. } => {
                    StatusCode::BAD_REQUEST
                }
                AdminError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
                AdminError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
                AdminError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Repository(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Repository(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Repository(_) | Self::Store(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    "Invalid credentials".to_string()
                }
                AuthError::NotOnAccessList => {
                    "This account is not on the access list".to_string()
                }
                AuthError::AlreadyRegistered => {
                    "This account already has a password".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::Session(_) | AuthError::PasswordHash(_) | AuthError::Repository(_) => {
                    "Authentication error".to_string()
                }
            },
            Self::Booking(BookingError::Repository(_)) => "Internal server error".to_string(),
            Self::Booking(err) => err.to_string(),
            Self::Admin(err) => match err {
                AdminError::Repository(RepositoryError::Conflict(msg)) => msg.clone(),
                AdminError::Repository(RepositoryError::NotFound) => "Not found".to_string(),
                AdminError::Repository(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
