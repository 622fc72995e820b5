//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::stores::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

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
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Store(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                StoreError::AlreadyExists(_) => StatusCode::CONFLICT,
                StoreError::Unauthenticated => StatusCode::UNAUTHORIZED,
                StoreError::BackendUnavailable(BackendError::RateLimited(_)) => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                StoreError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(err) => match err {
                StoreError::NotFound(msg) | StoreError::InvalidArgument(msg) => msg.clone(),
                StoreError::AlreadyExists(msg) => msg.clone(),
                StoreError::Unauthenticated => "Invalid credentials".to_owned(),
                StoreError::BackendUnavailable(BackendError::RateLimited(_)) => {
                    "Too many requests, please retry shortly".to_owned()
                }
                StoreError::BackendUnavailable(_) => "Storage service unavailable".to_owned(),
            },
            Self::BadRequest(msg) => msg.clone(),
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_owned(),
        };

        (status, message).into_response()
    }
}

impl AppError {
    /// Server-side failures that belong in Sentry, as opposed to ordinary
    /// client mistakes.
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Internal(_) | Self::Session(_) | Self::Store(StoreError::BackendUnavailable(_))
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after successful authentication.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
