use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a task entity as stored and returned by the API.
///
/// `owner` is fixed when the task is created and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Store-assigned numeric identifier.
    pub id: i64,
    /// The title of the task. Never empty.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Username of the account that owns the task.
    pub owner: String,
}

/// Input structure for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Partial update of a task. Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Applies the present fields to `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Query parameters accepted when listing tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Restrict the listing to tasks with this completion state.
    pub completed: Option<bool>,
}
