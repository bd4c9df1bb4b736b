use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use super::{AuthError, IdentityResolver, RequestIdentity, TokenCodec};
use crate::error::{AppError, UNAUTHORIZED_MESSAGE};

/// Paths served without a bearer token.
pub const PUBLIC_PATHS: &[&str] = &["/health", "/hello", "/test", "/register", "/login"];

/// Verifies the bearer token of every request outside the public paths and binds
/// the resulting `RequestIdentity` before any handler runs.
///
/// Rejections never look at the body or route parameters, and all of them
/// produce the same 401 response.
#[derive(Clone)]
pub struct AuthMiddleware {
    codec: Arc<TokenCodec>,
    resolver: IdentityResolver,
    public_paths: Rc<HashSet<String>>,
}

impl AuthMiddleware {
    pub fn new(codec: Arc<TokenCodec>, resolver: IdentityResolver) -> Self {
        Self {
            codec,
            resolver,
            public_paths: Rc::new(PUBLIC_PATHS.iter().map(|p| p.to_string()).collect()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            codec: Arc::clone(&self.codec),
            resolver: self.resolver.clone(),
            public_paths: Rc::clone(&self.public_paths),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
    resolver: IdentityResolver,
    public_paths: Rc<HashSet<String>>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.public_paths.contains(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = bearer_token(&req).map(str::to_owned);
        let service = Rc::clone(&self.service);
        let codec = Arc::clone(&self.codec);
        let resolver = self.resolver.clone();

        Box::pin(async move {
            let identity = authorize(token.as_deref(), &codec, &resolver).await?;
            req.extensions_mut().insert(identity);
            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Runs the Unauthenticated -> Authenticated transition for one request.
async fn authorize(
    token: Option<&str>,
    codec: &TokenCodec,
    resolver: &IdentityResolver,
) -> Result<RequestIdentity, AppError> {
    let token = token.ok_or_else(|| {
        log::debug!("request rejected: missing bearer token");
        unauthorized()
    })?;

    let subject = codec.verify(token).map_err(|e| {
        match e {
            AuthError::TokenExpired => log::info!("request rejected: token expired"),
            _ => log::warn!("request rejected: token invalid"),
        }
        unauthorized()
    })?;

    match resolver.resolve(&subject).await? {
        Some(identity) => Ok(RequestIdentity::new(identity.username)),
        None => {
            log::warn!("request rejected: token subject {} is not a known user", subject);
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> AppError {
    AppError::Unauthorized(UNAUTHORIZED_MESSAGE.into())
}
