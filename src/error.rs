//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used at the HTTP boundary.
//! Domain modules report their own errors (`AuthError`, `StoreError`); those are
//! folded into `AppError` here so handlers can use the `?` operator and actix
//! renders a consistent `{"error": "..."}` JSON body.
//!
//! Authentication failures of every kind collapse into the same few messages so a
//! client cannot tell which check rejected it.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Body text for every rejected bearer credential.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
/// Body text for every failed login.
pub const BAD_CREDENTIALS_MESSAGE: &str = "Invalid username or password";
/// Body text for a task that is absent or owned by someone else.
pub const TASK_NOT_FOUND_MESSAGE: &str = "Task not found";

/// Represents all possible errors that can leave a request handler.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired credentials (HTTP 401).
    Unauthorized(String),
    /// Malformed request or a registration conflict (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist for this caller (HTTP 404).
    NotFound(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// A storage failure (HTTP 500). The detail is logged, never returned.
    DatabaseError(String),
    /// Input validation failed (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// Deployment misconfiguration detected at startup.
    Configuration(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::ValidationError(msg) => HttpResponse::UnprocessableEntity().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg)
            | AppError::Configuration(msg) => {
                log::error!("request failed: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Internal server error"
                }))
            }
        }
    }
}

/// Folds the authentication taxonomy into HTTP errors.
///
/// `TokenInvalid` and `TokenExpired` produce the same response.
impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::DuplicateIdentity => {
                AppError::BadRequest("Username is already taken".into())
            }
            AuthError::AuthenticationFailure => {
                AppError::Unauthorized(BAD_CREDENTIALS_MESSAGE.into())
            }
            AuthError::TokenInvalid | AuthError::TokenExpired => {
                AppError::Unauthorized(UNAUTHORIZED_MESSAGE.into())
            }
            AuthError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::DuplicateIdentity => AppError::from(AuthError::DuplicateIdentity),
            StoreError::Database(msg) => AppError::DatabaseError(msg),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}
