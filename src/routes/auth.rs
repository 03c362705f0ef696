use crate::{
    auth::{
        generate_token, generate_token_pair, hash_password, verify_password, verify_token,
        LoginRequest, RefreshRequest, RegisterRequest, TokenKind,
    },
    error::AppError,
    models::{Role, User, UserResponse},
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Open to unauthenticated callers. The supplied role is honored unless the
/// deployment disables that (see `Config::allow_caller_role`).
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let register_data = register_data.into_inner();
    register_data.validate()?;

    // Check if email already exists
    if state
        .store
        .user_by_email(&register_data.email)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let role = if state.allow_caller_role {
        register_data.role
    } else {
        Role::User
    };

    let password_hash = hash_password(&register_data.password)?;
    let user = state
        .store
        .insert_user(User::new(
            register_data.email,
            register_data.full_name,
            password_hash,
            role,
        ))
        .await?;

    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(json!({
        "user": UserResponse::from(user),
        "message": "User created successfully"
    })))
}

/// Login user
///
/// Verifies credentials and returns an access/refresh token pair. A wrong
/// email or password gets one generic message; a correct password on a
/// deactivated account gets a distinct one. Both are 401 — the distinction
/// is deliberate and only made after the password has been verified.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = state
        .store
        .user_by_email(&login_data.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password.".into()))?;

    if !verify_password(&login_data.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid email or password.".into()));
    }

    // Checked only after the credentials proved valid.
    if !user.is_active {
        return Err(AppError::Unauthorized(
            "User account has been deactivated.".into(),
        ));
    }

    let pair = generate_token_pair(user.id)?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Exchange a refresh token for a new access token.
#[post("/refresh")]
pub async fn refresh(
    state: web::Data<AppState>,
    refresh_data: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    let claims = verify_token(&refresh_data.refresh, TokenKind::Refresh)?;

    // The account must still exist and be active to mint new tokens.
    let user = state
        .store
        .user_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".into()))?;
    if !user.is_active {
        return Err(AppError::Unauthorized(
            "User account has been deactivated.".into(),
        ));
    }

    let access = generate_token(user.id, TokenKind::Access)?;
    Ok(HttpResponse::Ok().json(json!({ "access": access })))
}
