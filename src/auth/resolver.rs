use std::sync::Arc;

use crate::models::UserIdentity;
use crate::store::{CredentialStore, StoreError};

/// Loads authentication profiles by username.
///
/// Shared by the login path and by the request middleware, which uses it to
/// refuse tokens whose subject no longer names a known account.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn CredentialStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, username: &str) -> Result<Option<UserIdentity>, StoreError> {
        self.store.find_by_username(username).await
    }

    pub async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.resolve(username).await?.is_some())
    }
}
