//! In-process store used when no `DATABASE_URL` is configured, and by the tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError, TaskRepository};
use crate::models::{NewTask, Task, TaskPatch, UserIdentity};

#[derive(Default)]
struct Users {
    next_id: i64,
    by_username: HashMap<String, UserIdentity>,
}

#[derive(Default)]
struct Tasks {
    next_id: i64,
    rows: BTreeMap<i64, Task>,
}

/// Credentials and tasks kept in memory behind async locks.
///
/// The username check and the insert happen under one write guard, so
/// concurrent registrations of the same name have exactly one winner.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Users>,
    tasks: RwLock<Tasks>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, StoreError> {
        Ok(self.users.read().await.by_username.get(username).cloned())
    }

    async fn save(&self, mut identity: UserIdentity) -> Result<UserIdentity, StoreError> {
        let mut users = self.users.write().await;

        if let Some(holder) = users.by_username.get(&identity.username) {
            if holder.id != identity.id {
                return Err(StoreError::DuplicateIdentity);
            }
        }

        match identity.id {
            None => {
                users.next_id += 1;
                identity.id = Some(users.next_id);
            }
            Some(id) => {
                let previous = users
                    .by_username
                    .iter()
                    .find(|(_, existing)| existing.id == Some(id))
                    .map(|(name, _)| name.clone())
                    .ok_or_else(|| StoreError::Database(format!("no user with id {}", id)))?;
                users.by_username.remove(&previous);
            }
        }

        users
            .by_username
            .insert(identity.username.clone(), identity.clone());
        Ok(identity)
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn list(&self, owner: &str, completed: Option<bool>) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .rows
            .values()
            .filter(|task| task.owner == owner)
            .filter(|task| completed.map_or(true, |c| task.completed == c))
            .cloned()
            .collect())
    }

    async fn find(&self, owner: &str, id: i64) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.rows.get(&id).filter(|task| task.owner == owner).cloned())
    }

    async fn insert(&self, owner: &str, task: NewTask) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        tasks.next_id += 1;
        let row = Task {
            id: tasks.next_id,
            title: task.title,
            description: task.description,
            completed: false,
            owner: owner.to_string(),
        };
        tasks.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        owner: &str,
        id: i64,
        patch: TaskPatch,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.rows.get_mut(&id) {
            Some(task) if task.owner == owner => {
                patch.apply_to(task);
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, owner: &str, id: i64) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().await;
        let owned = tasks.rows.get(&id).map_or(false, |task| task.owner == owner);
        if owned {
            tasks.rows.remove(&id);
        }
        Ok(owned)
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.rows.len();
        tasks.rows.retain(|_, task| task.owner != owner);
        Ok((before - tasks.rows.len()) as u64)
    }
}
