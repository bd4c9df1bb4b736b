//! Persistence seams for credentials and tasks.
//!
//! Every `TaskRepository` method takes the owning username and must constrain
//! the underlying query by it. Callers outside this crate reach tasks only
//! through [`crate::tasks::TaskStore`], which supplies the owner from a
//! verified [`crate::auth::RequestIdentity`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewTask, Task, TaskPatch, UserIdentity};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The username already belongs to a different record.
    #[error("username already exists")]
    DuplicateIdentity,
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                return StoreError::DuplicateIdentity;
            }
        }
        StoreError::Database(error.to_string())
    }
}

/// Username + password-hash persistence.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, StoreError>;

    /// Inserts a new identity (`id == None`) or updates the record with that id.
    ///
    /// Fails with `DuplicateIdentity` when the username is held by another record,
    /// including when two inserts for the same username race.
    async fn save(&self, identity: UserIdentity) -> Result<UserIdentity, StoreError>;
}

/// Owner-filtered task persistence.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self, owner: &str, completed: Option<bool>) -> Result<Vec<Task>, StoreError>;

    async fn find(&self, owner: &str, id: i64) -> Result<Option<Task>, StoreError>;

    async fn insert(&self, owner: &str, task: NewTask) -> Result<Task, StoreError>;

    /// Returns `None` without mutating anything when `id` is not owned by `owner`.
    async fn update(
        &self,
        owner: &str,
        id: i64,
        patch: TaskPatch,
    ) -> Result<Option<Task>, StoreError>;

    async fn delete(&self, owner: &str, id: i64) -> Result<bool, StoreError>;

    /// Returns the number of rows removed.
    async fn delete_all(&self, owner: &str) -> Result<u64, StoreError>;
}
