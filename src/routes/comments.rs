use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{Comment, CommentInput, CommentQuery, CommentUpdate, Task},
    policy,
    state::AppState,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Fetches the parent task of a comment for the policy check. A comment
/// whose task vanished should not exist (deletes cascade), so a dangling
/// reference is a server-side inconsistency, not a caller error.
async fn parent_task(state: &AppState, comment: &Comment) -> Result<Task, AppError> {
    state
        .store
        .task_by_id(comment.task_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError("Comment references a missing task".into())
        })
}

/// Lists comments visible to the actor: admins all of them, everyone else
/// only comments on tasks assigned to them. Filterable by `task`.
#[get("")]
pub async fn list_comments(
    state: web::Data<AppState>,
    query: web::Query<CommentQuery>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;
    let scope = policy::comment_scope(&actor)?;

    let comments = state.store.list_comments(scope, &query).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Creates a comment on a task.
///
/// The referenced task is resolved from the store before any ownership
/// check: a nonexistent task is a 400 for admins too. The author is always
/// the acting user.
#[post("")]
pub async fn create_comment(
    state: web::Data<AppState>,
    comment_data: web::Json<CommentInput>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    comment_data.validate()?;
    let actor = state.actor(user_id.0).await?;

    let input = comment_data.into_inner();
    let task = state
        .store
        .task_by_id(input.task)
        .await?
        .ok_or_else(|| AppError::ValidationError("Referenced task does not exist".into()))?;
    policy::create_comment(&actor, &task)?;

    let comment = state
        .store
        .insert_comment(Comment::new(task.id, actor.id, input.content))
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Retrieves a single comment. Access follows the parent task's assignee,
/// not the comment's author.
#[get("/{id}")]
pub async fn get_comment(
    state: web::Data<AppState>,
    comment_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;

    let comment = state
        .store
        .comment_by_id(comment_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    let task = parent_task(&state, &comment).await?;
    policy::access_comment(&actor, &task)?;

    Ok(HttpResponse::Ok().json(comment))
}

async fn apply_comment_update(
    state: &AppState,
    id: Uuid,
    update: CommentUpdate,
    user_id: Uuid,
) -> Result<Comment, AppError> {
    update.validate()?;
    let actor = state.actor(user_id).await?;

    let comment = state
        .store
        .comment_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    let task = parent_task(state, &comment).await?;
    policy::access_comment(&actor, &task)?;

    state
        .store
        .update_comment(id, update.content)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))
}

/// Updates a comment's content, the only mutable field.
#[put("/{id}")]
pub async fn update_comment(
    state: web::Data<AppState>,
    comment_id: web::Path<Uuid>,
    update: web::Json<CommentUpdate>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let updated =
        apply_comment_update(&state, comment_id.into_inner(), update.into_inner(), user_id.0)
            .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// PATCH alias for [`update_comment`]; a comment has one mutable field, so
/// full and partial update coincide.
#[patch("/{id}")]
pub async fn patch_comment(
    state: web::Data<AppState>,
    comment_id: web::Path<Uuid>,
    update: web::Json<CommentUpdate>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let updated =
        apply_comment_update(&state, comment_id.into_inner(), update.into_inner(), user_id.0)
            .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a comment. Same task-ownership rule as reads and updates.
#[delete("/{id}")]
pub async fn delete_comment(
    state: web::Data<AppState>,
    comment_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;
    let id = comment_id.into_inner();

    let comment = state
        .store
        .comment_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".into()))?;
    let task = parent_task(&state, &comment).await?;
    policy::access_comment(&actor, &task)?;

    state.store.delete_comment(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
