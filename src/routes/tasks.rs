use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{Task, TaskChanges, TaskInput, TaskQuery},
    policy,
    state::AppState,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Lists tasks visible to the authenticated actor.
///
/// Admins see every task; everyone else sees only tasks assigned to them.
/// The scope is part of the store query, not applied after the fetch.
/// Supports filtering by `status` and `assigned_to`, plus a case-insensitive
/// `search` over title and description. Newest first.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    query: web::Query<TaskQuery>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;
    let scope = policy::task_scope(&actor)?;

    let tasks = state.store.list_tasks(scope, &query).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task. Admin only; the assignee must be an existing user
/// (active or not). Timestamps come from the server clock.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    task_data: web::Json<TaskInput>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let actor = state.actor(user_id.0).await?;
    policy::create_task(&actor)?;

    let input = task_data.into_inner();
    if state.store.user_by_id(input.assigned_to).await?.is_none() {
        return Err(AppError::ValidationError(
            "Assigned user does not exist".into(),
        ));
    }

    let task = state.store.insert_task(Task::new(input)).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a single task.
///
/// The object-level check runs regardless of how the task was found: a
/// non-admin asking for someone else's task gets 403 with the policy's
/// reason, and a missing task is 404.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;

    let task = state
        .store
        .task_by_id(task_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    policy::access_task(&actor, &task)?;

    Ok(HttpResponse::Ok().json(task))
}

/// Replaces a task's mutable fields. Same object-level rule as reads;
/// `updated_at` is stamped by the store.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let actor = state.actor(user_id.0).await?;
    let id = task_id.into_inner();

    let task = state
        .store
        .task_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    policy::access_task(&actor, &task)?;

    let input = task_data.into_inner();
    if state.store.user_by_id(input.assigned_to).await?.is_none() {
        return Err(AppError::ValidationError(
            "Assigned user does not exist".into(),
        ));
    }

    let updated = state
        .store
        .update_task(id, TaskChanges::from(input))
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Partially updates a task; only the provided fields change.
#[patch("/{id}")]
pub async fn patch_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    changes: web::Json<TaskChanges>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    changes.validate()?;
    let actor = state.actor(user_id.0).await?;
    let id = task_id.into_inner();

    let task = state
        .store
        .task_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    policy::access_task(&actor, &task)?;

    let changes = changes.into_inner();
    if let Some(assigned_to) = changes.assigned_to {
        if state.store.user_by_id(assigned_to).await?.is_none() {
            return Err(AppError::ValidationError(
                "Assigned user does not exist".into(),
            ));
        }
    }

    let updated = state
        .store
        .update_task(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task and its comments. Admin only.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    task_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;
    policy::delete_task(&actor)?;

    if !state.store.delete_task(task_id.into_inner()).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}
