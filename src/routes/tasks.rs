use crate::{
    auth::RequestIdentity,
    error::{AppError, TASK_NOT_FOUND_MESSAGE},
    models::{NewTask, TaskPatch, TaskQuery},
    tasks::TaskStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound(TASK_NOT_FOUND_MESSAGE.into())
}

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `completed` (optional): only tasks with this completion state.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `400 Bad Request`: `completed` is not a boolean.
/// - `401 Unauthorized`: missing, invalid or expired token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskStore>,
    query_params: web::Query<TaskQuery>,
    identity: RequestIdentity,
) -> Result<impl Responder, AppError> {
    let found = match query_params.completed {
        Some(completed) => tasks.list_by_completion(&identity, completed).await?,
        None => tasks.list_all(&identity).await?,
    };
    Ok(HttpResponse::Ok().json(found))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Task`, with `completed = false`.
/// - `401 Unauthorized`: missing, invalid or expired token.
/// - `422 Unprocessable Entity`: empty or overly long title, overly long description.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskStore>,
    task_data: web::Json<NewTask>,
    identity: RequestIdentity,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let NewTask { title, description } = task_data.into_inner();

    let task = tasks.create(&identity, title, description).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task.
///
/// A task owned by another user yields the same `404` as a missing one.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskStore>,
    task_id: web::Path<i64>,
    identity: RequestIdentity,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .get_by_id(&identity, task_id.into_inner())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task.
///
/// Only fields present in the body are changed.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `404 Not Found`: no such task for this user.
/// - `422 Unprocessable Entity`: a present field fails validation.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskStore>,
    task_id: web::Path<i64>,
    patch: web::Json<TaskPatch>,
    identity: RequestIdentity,
) -> Result<impl Responder, AppError> {
    patch.validate()?;

    let task = tasks
        .update(&identity, task_id.into_inner(), patch.into_inner())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes one task.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task for this user, including tasks owned by others.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskStore>,
    task_id: web::Path<i64>,
    identity: RequestIdentity,
) -> Result<impl Responder, AppError> {
    if !tasks.delete(&identity, task_id.into_inner()).await? {
        return Err(not_found());
    }
    Ok(HttpResponse::NoContent().finish())
}

/// Deletes every task owned by the authenticated user.
#[delete("")]
pub async fn delete_tasks(
    tasks: web::Data<TaskStore>,
    identity: RequestIdentity,
) -> Result<impl Responder, AppError> {
    tasks.delete_all(&identity).await?;
    Ok(HttpResponse::NoContent().finish())
}
