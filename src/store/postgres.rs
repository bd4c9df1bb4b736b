//! Postgres-backed store.
//!
//! Username uniqueness is enforced by the `users.username` UNIQUE constraint,
//! so a registration race surfaces as a unique violation on the losing insert.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;

use super::{CredentialStore, StoreError, TaskRepository};
use crate::models::{NewTask, Task, TaskPatch, UserIdentity};

const TASK_COLUMNS: &str = "id, title, description, completed, owner";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects with bounded acquire and statement timeouts, then applies migrations.
    pub async fn connect(database_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let statement_timeout = format!("SET statement_timeout = {}", timeout.as_millis());
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(timeout)
            .after_connect(move |conn, _meta| {
                let statement_timeout = statement_timeout.clone();
                Box::pin(async move {
                    conn.execute(statement_timeout.as_str()).await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(format!("migration failed: {}", e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserIdentity>, StoreError> {
        let identity = sqlx::query_as::<_, UserIdentity>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn save(&self, identity: UserIdentity) -> Result<UserIdentity, StoreError> {
        let saved = match identity.id {
            None => {
                sqlx::query_as::<_, UserIdentity>(
                    "INSERT INTO users (username, password_hash) VALUES ($1, $2)
                     RETURNING id, username, password_hash",
                )
                .bind(&identity.username)
                .bind(&identity.password_hash)
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => sqlx::query_as::<_, UserIdentity>(
                "UPDATE users SET username = $1, password_hash = $2 WHERE id = $3
                 RETURNING id, username, password_hash",
            )
            .bind(&identity.username)
            .bind(&identity.password_hash)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::Database(format!("no user with id {}", id)))?,
        };
        Ok(saved)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn list(&self, owner: &str, completed: Option<bool>) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks
             WHERE owner = $1 AND ($2::BOOLEAN IS NULL OR completed = $2)
             ORDER BY id",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .bind(completed)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find(&self, owner: &str, id: i64) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn insert(&self, owner: &str, task: NewTask) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, completed, owner)
             VALUES ($1, $2, FALSE, $3)
             RETURNING {}",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(task.title)
            .bind(task.description)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: &str,
        id: i64,
        patch: TaskPatch,
    ) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "UPDATE tasks
             SET title = COALESCE($1, title),
                 description = COALESCE($2, description),
                 completed = COALESCE($3, completed)
             WHERE id = $4 AND owner = $5
             RETURNING {}",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, Task>(&sql)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.completed)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, owner: &str, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, owner: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
