//! User and profile repository.
//!
//! Account creation is a two-step write (user row, then profile row); the
//! invitation workflow depends on the trait so the rollback path can be
//! exercised with mocks.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::user::{AccountSummary, Profile, User};

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";
const PROFILE_COLUMNS: &str = "id, user_id, full_name, role, created_at, updated_at";

/// Repository trait for account operations.
///
/// This trait is designed to be mockable using mockall for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Find a user by (lowercased) email.
    async fn find_by_email(&self, db: &PgPool, email: &str) -> Result<Option<User>, AppError>;

    /// Find a user by ID.
    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<Option<User>, AppError>;

    /// Whether an account already holds the email.
    async fn email_exists(&self, db: &PgPool, email: &str) -> Result<bool, AppError>;

    /// Insert a new user row.
    async fn create_user(&self, db: &PgPool, user: &User) -> Result<(), AppError>;

    /// Delete a user row. Compensating action when profile creation fails.
    async fn delete_user(&self, db: &PgPool, id: &str) -> Result<(), AppError>;

    /// Insert a new profile row.
    async fn create_profile(&self, db: &PgPool, profile: &Profile) -> Result<(), AppError>;

    /// Find the profile attached to a user.
    async fn find_profile_by_user_id(
        &self,
        db: &PgPool,
        user_id: &str,
    ) -> Result<Option<Profile>, AppError>;
}

/// Concrete implementation of UserRepositoryTrait.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn find_by_email(&self, db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email.to_lowercase())
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<Option<User>, AppError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    async fn email_exists(&self, db: &PgPool, email: &str) -> Result<bool, AppError> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(db)
            .await?;
        Ok(exists.is_some())
    }

    async fn create_user(&self, db: &PgPool, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(db)
        .await?;
        Ok(())
    }

    async fn delete_user(&self, db: &PgPool, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    async fn create_profile(&self, db: &PgPool, profile: &Profile) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO profiles (id, user_id, full_name, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&profile.id)
        .bind(&profile.user_id)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(db)
        .await?;
        Ok(())
    }

    async fn find_profile_by_user_id(
        &self,
        db: &PgPool,
        user_id: &str,
    ) -> Result<Option<Profile>, AppError> {
        let query = format!(
            "SELECT {} FROM profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(db)
            .await?;
        Ok(profile)
    }
}

/// Admin listing of all accounts with their profiles.
pub async fn list_accounts(pool: &PgPool) -> Result<Vec<AccountSummary>, AppError> {
    let rows = sqlx::query_as::<_, AccountSummary>(
        "SELECT u.id, u.email, p.full_name, LOWER(p.role) as role, u.created_at \
         FROM users u JOIN profiles p ON p.user_id = u.id \
         ORDER BY u.created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
