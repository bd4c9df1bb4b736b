//! Wiring of the authentication core and the stores into actix application data.

use std::sync::Arc;

use actix_web::web;

use crate::auth::{AuthMiddleware, AuthService, IdentityResolver, PasswordHasher, TokenCodec};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::store::{CredentialStore, TaskRepository};
use crate::tasks::TaskStore;

/// Everything a worker needs to serve requests. Cheap to clone.
#[derive(Clone)]
pub struct Services {
    pub auth: web::Data<AuthService>,
    pub tasks: web::Data<TaskStore>,
    codec: Arc<TokenCodec>,
    resolver: IdentityResolver,
}

impl Services {
    /// Builds the services. Fails on a bad signing key or hasher setup, which
    /// callers treat as fatal at startup.
    pub fn new(
        config: &AuthConfig,
        credentials: Arc<dyn CredentialStore>,
        tasks: Arc<dyn TaskRepository>,
    ) -> Result<Self, AppError> {
        let codec = Arc::new(
            TokenCodec::new(config.jwt_secret.as_bytes())
                .map_err(|e| AppError::Configuration(e.to_string()))?,
        );
        let resolver = IdentityResolver::new(Arc::clone(&credentials));
        let auth = AuthService::new(
            credentials,
            PasswordHasher::new(config.bcrypt_cost),
            Arc::clone(&codec),
            config.token_ttl,
        )
        .map_err(|e| AppError::Configuration(e.to_string()))?;

        Ok(Self {
            auth: web::Data::new(auth),
            tasks: web::Data::new(TaskStore::new(tasks, resolver.clone())),
            codec,
            resolver,
        })
    }

    /// A fresh middleware instance for one worker's `App`.
    pub fn auth_middleware(&self) -> AuthMiddleware {
        AuthMiddleware::new(Arc::clone(&self.codec), self.resolver.clone())
    }

    /// Registers the shared services as application data.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.auth.clone())
            .app_data(self.tasks.clone());
    }
}
