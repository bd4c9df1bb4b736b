use std::sync::Arc;

use chrono::Duration;
use log::{info, warn};

use super::{AuthError, IdentityResolver, PasswordHasher, TokenCodec};
use crate::models::UserIdentity;
use crate::store::{CredentialStore, StoreError};

/// Registration and login, independent of the web framework.
///
/// Login is stateless: a successful `authenticate` only mints a token.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    resolver: IdentityResolver,
    hasher: PasswordHasher,
    codec: Arc<TokenCodec>,
    token_ttl: Duration,
    // Verified against when the username is unknown, so both failure paths cost one bcrypt run.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        codec: Arc<TokenCodec>,
        token_ttl: Duration,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash("taskvault-timing-equalizer")?;
        Ok(Self {
            resolver: IdentityResolver::new(Arc::clone(&store)),
            store,
            hasher,
            codec,
            token_ttl,
            dummy_hash,
        })
    }

    /// Creates a new account.
    ///
    /// The early lookup gives the common case a cheap answer; the store's
    /// uniqueness check is what settles concurrent registrations.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if self.resolver.exists(username).await? {
            info!("registration rejected, username taken: {}", username);
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = self.hash_blocking(password.to_string()).await?;

        match self
            .store
            .save(UserIdentity::new(username, password_hash))
            .await
        {
            Ok(_) => {
                info!("user registered: {}", username);
                Ok(())
            }
            Err(StoreError::DuplicateIdentity) => {
                info!("registration lost race for username: {}", username);
                Err(AuthError::DuplicateIdentity)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Checks the credentials and issues a token on success.
    ///
    /// Unknown users and wrong passwords both yield `AuthenticationFailure`;
    /// the distinction only reaches the log.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let identity = self.resolver.resolve(username).await?;

        let (stored_hash, known) = match &identity {
            Some(identity) => (identity.password_hash.clone(), true),
            None => (self.dummy_hash.clone(), false),
        };
        let matches = self.verify_blocking(password.to_string(), stored_hash).await?;

        if !known {
            warn!("login failed, unknown user: {}", username);
            return Err(AuthError::AuthenticationFailure);
        }
        if !matches {
            warn!("login failed, bad password for user: {}", username);
            return Err(AuthError::AuthenticationFailure);
        }

        let token = self.codec.issue(username, self.token_ttl)?;
        info!("user logged in: {}", username);
        Ok(token)
    }

    async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))?
    }

    async fn verify_blocking(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("verification task failed: {}", e)))?
    }
}
