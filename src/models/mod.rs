pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskPatch, TaskQuery};
pub use user::UserIdentity;
