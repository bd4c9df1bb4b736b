use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::fmt;
use std::future::{ready, Ready};

use crate::error::{AppError, UNAUTHORIZED_MESSAGE};

/// The verified username bound to one in-flight request.
///
/// Only `AuthMiddleware` creates these, after the token has been verified and the
/// subject resolved to a known account. The value lives in the request's
/// extensions and is dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    username: String,
}

impl RequestIdentity {
    pub(crate) fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Display for RequestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// Extracts the identity bound by `AuthMiddleware`.
///
/// If nothing was bound (a route outside the middleware, or a public path),
/// the handler is refused with 401 rather than run without an owner.
impl FromRequest for RequestIdentity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<RequestIdentity>().cloned() {
            Some(identity) => ready(Ok(identity)),
            None => {
                log::error!("no identity bound for protected path {}", req.path());
                let err = AppError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string());
                ready(Err(err.into()))
            }
        }
    }
}
