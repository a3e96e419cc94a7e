//! Shared helpers for integration tests. None of these touch a live
//! database: pools are lazy and never connected.
#![allow(dead_code)]

use coachlog_backend::config::Config;
use coachlog_backend::models::user::{AuthUser, Profile, User, UserRole};
use sqlx::PgPool;

pub fn lazy_pool() -> PgPool {
    PgPool::connect_lazy("postgres://postgres@localhost/coachlog_test").expect("lazy pool")
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/coachlog".into(),
        jwt_secret: "secret".into(),
        jwt_expiration_hours: 12,
        app_base_url: "https://app.example.org".into(),
        invitation_expiry_days: 7,
        time_zone: chrono_tz::UTC,
        sms_account_sid: None,
        sms_auth_token: None,
        sms_from_number: None,
        emergency_numbers: vec![],
    }
}

pub fn account(id: &str, name: &str, role: UserRole) -> AuthUser {
    let mut user = User::new(format!("{}@example.org", id), "hash".into());
    user.id = id.to_string();
    let profile = Profile::new(user.id.clone(), name.to_string(), role);
    AuthUser { user, profile }
}

/// Pulls the raw token back out of a shareable link.
pub fn token_from_link(link: &str) -> String {
    link.split("token=")
        .nth(1)
        .expect("link carries a token")
        .to_string()
}
