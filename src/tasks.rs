//! The ownership-scoped task store.
//!
//! Every operation requires the `RequestIdentity` bound by the auth middleware,
//! resolves it to the owning account and only then touches task rows, always
//! filtered by that owner. A task owned by someone else looks exactly like a
//! task that does not exist.

use std::sync::Arc;

use log::{debug, warn};

use crate::auth::{IdentityResolver, RequestIdentity};
use crate::error::{AppError, UNAUTHORIZED_MESSAGE};
use crate::models::{NewTask, Task, TaskPatch, UserIdentity};
use crate::store::TaskRepository;

#[derive(Clone)]
pub struct TaskStore {
    repo: Arc<dyn TaskRepository>,
    resolver: IdentityResolver,
}

impl TaskStore {
    pub fn new(repo: Arc<dyn TaskRepository>, resolver: IdentityResolver) -> Self {
        Self { repo, resolver }
    }

    pub async fn list_all(&self, identity: &RequestIdentity) -> Result<Vec<Task>, AppError> {
        let owner = self.owner(identity).await?;
        Ok(self.repo.list(&owner.username, None).await?)
    }

    pub async fn list_by_completion(
        &self,
        identity: &RequestIdentity,
        completed: bool,
    ) -> Result<Vec<Task>, AppError> {
        let owner = self.owner(identity).await?;
        Ok(self.repo.list(&owner.username, Some(completed)).await?)
    }

    pub async fn get_by_id(
        &self,
        identity: &RequestIdentity,
        id: i64,
    ) -> Result<Option<Task>, AppError> {
        let owner = self.owner(identity).await?;
        Ok(self.repo.find(&owner.username, id).await?)
    }

    /// Creates a task owned by the caller with `completed = false`.
    ///
    /// The title is expected to have been validated already; an empty one is
    /// still refused here.
    pub async fn create(
        &self,
        identity: &RequestIdentity,
        title: String,
        description: Option<String>,
    ) -> Result<Task, AppError> {
        if title.trim().is_empty() {
            return Err(AppError::ValidationError("title must not be empty".into()));
        }
        let owner = self.owner(identity).await?;
        let task = self
            .repo
            .insert(&owner.username, NewTask { title, description })
            .await?;
        debug!("task {} created for {}", task.id, owner.username);
        Ok(task)
    }

    /// Applies only the fields present in `patch`.
    ///
    /// Returns `None`, with nothing changed, if the caller does not own `id`.
    pub async fn update(
        &self,
        identity: &RequestIdentity,
        id: i64,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let owner = self.owner(identity).await?;
        if patch.is_empty() {
            return Ok(self.repo.find(&owner.username, id).await?);
        }
        Ok(self.repo.update(&owner.username, id, patch).await?)
    }

    pub async fn delete(&self, identity: &RequestIdentity, id: i64) -> Result<bool, AppError> {
        let owner = self.owner(identity).await?;
        let deleted = self.repo.delete(&owner.username, id).await?;
        if deleted {
            debug!("task {} deleted for {}", id, owner.username);
        }
        Ok(deleted)
    }

    pub async fn delete_all(&self, identity: &RequestIdentity) -> Result<u64, AppError> {
        let owner = self.owner(identity).await?;
        let removed = self.repo.delete_all(&owner.username).await?;
        debug!("{} tasks deleted for {}", removed, owner.username);
        Ok(removed)
    }

    async fn owner(&self, identity: &RequestIdentity) -> Result<UserIdentity, AppError> {
        match self.resolver.resolve(identity.username()).await? {
            Some(owner) => Ok(owner),
            None => {
                warn!("identity {} no longer resolves to an account", identity);
                Err(AppError::Unauthorized(UNAUTHORIZED_MESSAGE.into()))
            }
        }
    }
}
