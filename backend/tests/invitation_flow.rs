//! End-to-end invitation lifecycle against in-memory stores.

mod support;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use coachlog_backend::error::AppError;
use coachlog_backend::models::invitation::Invitation;
use coachlog_backend::models::user::{Profile, User, UserRole};
use coachlog_backend::repositories::{InvitationRepositoryTrait, UserRepositoryTrait};
use coachlog_backend::services::InvitationWorkflow;
use sqlx::PgPool;
use support::{account, lazy_pool, test_config, token_from_link};

#[derive(Default, Clone)]
struct MemInvitations {
    rows: Arc<Mutex<Vec<Invitation>>>,
}

#[async_trait]
impl InvitationRepositoryTrait for MemInvitations {
    async fn find_live_by_email(
        &self,
        _db: &PgPool,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.email == email && i.used_at.is_none() && i.expires_at > now)
            .cloned())
    }

    async fn delete_expired_for_email(
        &self,
        _db: &PgPool,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|i| !(i.email == email && i.used_at.is_none() && i.expires_at <= now));
        Ok((before - rows.len()) as u64)
    }

    async fn insert(&self, _db: &PgPool, invitation: &Invitation) -> Result<(), AppError> {
        self.rows.lock().unwrap().push(invitation.clone());
        Ok(())
    }

    async fn find_by_token_hash(
        &self,
        _db: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Invitation>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.token_hash == token_hash)
            .cloned())
    }

    async fn mark_used(
        &self,
        _db: &PgPool,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|i| i.id == id && i.used_at.is_none()) {
            Some(row) => {
                row.used_at = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_all(&self, _db: &PgPool) -> Result<Vec<Invitation>, AppError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn delete(&self, _db: &PgPool, id: &str) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|i| i.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
struct MemUsers {
    users: Mutex<Vec<User>>,
    profiles: Mutex<Vec<Profile>>,
}

#[async_trait]
impl UserRepositoryTrait for MemUsers {
    async fn find_by_email(&self, _db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, _db: &PgPool, id: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn email_exists(&self, _db: &PgPool, email: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn create_user(&self, _db: &PgPool, user: &User) -> Result<(), AppError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn delete_user(&self, _db: &PgPool, id: &str) -> Result<(), AppError> {
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }

    async fn create_profile(&self, _db: &PgPool, profile: &Profile) -> Result<(), AppError> {
        self.profiles.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn find_profile_by_user_id(
        &self,
        _db: &PgPool,
        user_id: &str,
    ) -> Result<Option<Profile>, AppError> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }
}

fn workflow() -> InvitationWorkflow<MemInvitations, MemUsers> {
    InvitationWorkflow::with_repos(MemInvitations::default(), MemUsers::default())
}

#[tokio::test]
async fn full_invitation_scenario() {
    let pool = lazy_pool();
    let config = test_config();
    let admin = account("admin-1", "Admin", UserRole::Admin);
    let flow = workflow();

    // Admin invites, link carries the token, expiry is a week out.
    let created = flow
        .create(&pool, &config, "new@x.com", &admin)
        .await
        .expect("invitation issued");
    assert_eq!(created.email, "new@x.com");
    let remaining = created.expires_at - Utc::now();
    assert!(remaining > Duration::days(6) && remaining <= Duration::days(7));
    let token = token_from_link(&created.link);

    // Verify is read-only and repeatable.
    for _ in 0..2 {
        let verified = flow.verify(&pool, &token).await.expect("link is live");
        assert_eq!(verified.email, "new@x.com");
    }

    // Consume provisions the account and burns the token.
    let user_id = flow
        .consume(&pool, &token, "Jane Doe", "longenough")
        .await
        .expect("consume succeeds");
    assert!(!user_id.is_empty());

    let err = flow
        .consume(&pool, &token, "Jane Doe", "longenough")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TokenUsed(_)));

    let err = flow.verify(&pool, &token).await.unwrap_err();
    assert!(matches!(err, AppError::TokenUsed(_)));
}

#[tokio::test]
async fn concurrent_consume_succeeds_exactly_once() {
    let pool = lazy_pool();
    let config = test_config();
    let admin = account("admin-1", "Admin", UserRole::Admin);
    let flow = workflow();

    let created = flow
        .create(&pool, &config, "race@x.com", &admin)
        .await
        .expect("invitation issued");
    let token = token_from_link(&created.link);

    let (first, second) = tokio::join!(
        flow.consume(&pool, &token, "First Caller", "longenough"),
        flow.consume(&pool, &token, "Second Caller", "longenough"),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent consume may win");
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(
        loser.unwrap_err(),
        AppError::TokenUsed(_) | AppError::Conflict(_) | AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn reinvite_after_expiry_replaces_the_stale_row() {
    let pool = lazy_pool();
    let config = test_config();
    let admin = account("admin-1", "Admin", UserRole::Admin);

    let invitations = MemInvitations::default();
    invitations.rows.lock().unwrap().push(Invitation {
        id: "stale".into(),
        email: "new@x.com".into(),
        token_hash: "old-hash".into(),
        invited_by: "admin-1".into(),
        expires_at: Utc::now() - Duration::days(1),
        created_at: Utc::now() - Duration::days(8),
        used_at: None,
    });
    let rows = Arc::clone(&invitations.rows);
    let flow = InvitationWorkflow::with_repos(invitations, MemUsers::default());

    let created = flow
        .create(&pool, &config, "new@x.com", &admin)
        .await
        .expect("expired row is replaced");

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, created.id);
}

#[tokio::test]
async fn second_live_invitation_for_same_email_conflicts() {
    let pool = lazy_pool();
    let config = test_config();
    let admin = account("admin-1", "Admin", UserRole::Admin);
    let flow = workflow();

    flow.create(&pool, &config, "new@x.com", &admin)
        .await
        .expect("first invitation");
    let err = flow
        .create(&pool, &config, "new@x.com", &admin)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // A different email is fine; uniqueness is per-email, not global.
    flow.create(&pool, &config, "other@x.com", &admin)
        .await
        .expect("second email invitation");
}
