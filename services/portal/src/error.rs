//! Custom error types for the portal
//!
//! Every handler failure ends up here and is rendered as an HTML error page.
//! Internal details are logged, never shown.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use common::error::{CacheError, DatabaseError};
use thiserror::Error;
use tracing::{error, warn};

use crate::{password::PasswordError, templates};

/// Custom error type for the portal
#[derive(Error, Debug)]
pub enum AppError {
    /// Signup with a username that already exists
    #[error("Username is already taken")]
    UsernameTaken,

    /// Login refused by the failed-login limiter
    #[error("Too many failed login attempts")]
    TooManyAttempts,

    /// Password hashing or verification failed
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    /// User store error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Session store error
    #[error("Session store error: {0}")]
    Session(#[from] CacheError),
}

impl AppError {
    /// HTTP status and client-facing message
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::UsernameTaken => (StatusCode::CONFLICT, "That username is already taken."),
            AppError::TooManyAttempts => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many failed login attempts. Please try again later.",
            ),
            AppError::Password(_) | AppError::Database(_) | AppError::Session(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.",
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        (status, Html(templates::error_page(status, message))).into_response()
    }
}
