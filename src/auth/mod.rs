pub mod extractors;
pub mod middleware;
pub mod password;
pub mod resolver;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::store::StoreError;

// Re-export necessary items
pub use extractors::RequestIdentity;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use resolver::IdentityResolver;
pub use service::AuthService;
pub use token::{Claims, TokenCodec};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Failures of the authentication core.
///
/// The HTTP layer collapses `TokenInvalid` and `TokenExpired` into one response,
/// and `AuthenticationFailure` never says which check failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("username already exists")]
    DuplicateIdentity,
    #[error("invalid username or password")]
    AuthenticationFailure,
    #[error("token is invalid")]
    TokenInvalid,
    #[error("token has expired")]
    TokenExpired,
    #[error("internal authentication error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateIdentity => AuthError::DuplicateIdentity,
            StoreError::Database(msg) => AuthError::Internal(msg),
        }
    }
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(length(min = 1), custom = "validate_password_bytes")]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username for the new account.
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Password for the new account, at most 72 bytes.
    #[validate(length(min = 1), custom = "validate_password_bytes")]
    pub password: String,
}

/// bcrypt ignores everything past this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut error = ValidationError::new("password_too_long");
        error.message = Some(
            format!("Password must be at most {} bytes", MAX_PASSWORD_BYTES).into(),
        );
        return Err(error);
    }
    Ok(())
}

/// Response body of a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed token, rendered as `Bearer <jwt>`.
    pub token: String,
}

impl AuthResponse {
    pub fn bearer(token: &str) -> Self {
        Self {
            token: format!("Bearer {}", token),
        }
    }
}

/// Response body of a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
}
