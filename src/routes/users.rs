use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{UserResponse, UserUpdate},
    policy,
    state::AppState,
};
use actix_web::{delete, get, patch, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Lists all users. Admin only.
#[get("")]
pub async fn list_users(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;
    policy::manage_users(&actor)?;

    let users = state.store.list_users().await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(users))
}

/// Retrieves a single user. Admin only.
#[get("/{id}")]
pub async fn get_user(
    state: web::Data<AppState>,
    target_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;
    policy::manage_users(&actor)?;

    let user = state
        .store
        .user_by_id(target_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Updates a user's email, full name, or role. Admin only.
#[put("/{id}")]
pub async fn update_user(
    state: web::Data<AppState>,
    target_id: web::Path<Uuid>,
    update: web::Json<UserUpdate>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    update.validate()?;
    let actor = state.actor(user_id.0).await?;
    policy::manage_users(&actor)?;

    let user = state
        .store
        .update_user(target_id.into_inner(), update.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Hard-deletes a user. Admin only, and refused while any task still
/// references the user; soft delete is the supported path for accounts
/// with history.
#[delete("/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    target_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;
    policy::manage_users(&actor)?;

    if !state.store.delete_user(target_id.into_inner()).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// Deactivates a user (soft delete).
///
/// Routing already guarantees an authenticated caller, but the admin role
/// is re-checked here explicitly; the two gates are intentionally separate.
/// Deactivating an already-inactive user succeeds with the same response.
#[patch("/{id}/soft_delete")]
pub async fn soft_delete_user(
    state: web::Data<AppState>,
    target_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let actor = state.actor(user_id.0).await?;
    policy::soft_delete_user(&actor)?;

    let user = state
        .store
        .deactivate_user(target_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    log::info!("soft deleted user {}", user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("User {} has been soft deleted", user.email)
    })))
}
