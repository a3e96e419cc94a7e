use axum::{
    extract::{Extension, State},
    Json,
};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::user::{AuthUser, LoginRequest, LoginResponse, UserResponse},
    repositories::{UserRepository, UserRepositoryTrait},
    utils::{jwt::create_access_token, password::verify_password},
};

pub async fn login(
    State((pool, config)): State<(PgPool, Config)>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let users = UserRepository::new();
    let user = users
        .find_by_email(&pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let matches = verify_password(&payload.password, &user.password_hash)?;
    if !matches {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let profile = users
        .find_profile_by_user_id(&pool, &user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let access_token = create_access_token(
        user.id.clone(),
        user.email.clone(),
        profile.role.as_str().to_string(),
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )
    .map_err(AppError::InternalServerError)?;

    let account = AuthUser { user, profile };
    Ok(Json(LoginResponse {
        access_token,
        user: UserResponse::from(&account),
    }))
}

pub async fn me(Extension(account): Extension<AuthUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&account))
}
