use axum::{extract::State, Json};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::user::AccountSummary,
    repositories::user as user_repo,
};

/// Admin: list every account with its profile.
pub async fn list_users(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<Vec<AccountSummary>>, AppError> {
    let accounts = user_repo::list_accounts(&pool).await?;
    Ok(Json(accounts))
}
