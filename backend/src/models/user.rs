//! Models that represent accounts, profiles, and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of an authentication account.
///
/// Holds credentials only; display data and the role live on [`Profile`].
pub struct User {
    /// Unique identifier for the user.
    pub id: String,
    /// Lowercased email used for login and invitation matching.
    pub email: String,
    /// Argon2 hash of the user's password.
    pub password_hash: String,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Display name and role for an account.
pub struct Profile {
    /// Unique identifier for the profile.
    pub id: String,
    /// Account this profile belongs to.
    pub user_id: String,
    /// Human-readable full name.
    pub full_name: String,
    /// Role describing the user's privileges.
    pub role: UserRole,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::Type, ToSchema, Default, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Supported user roles stored in the database.
pub enum UserRole {
    /// Front-line job coach with access to their own clients and records.
    #[default]
    Worker,
    /// Administrator role with elevated permissions.
    Admin,
}

impl UserRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Worker => "worker",
            UserRole::Admin => "admin",
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            // primary canonical values (snake_case)
            "worker" => Ok(UserRole::Worker),
            "admin" => Ok(UserRole::Admin),
            // tolerate common legacy casings
            "Worker" | "WORKER" => Ok(UserRole::Worker),
            "Admin" | "ADMIN" => Ok(UserRole::Admin),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["worker", "admin"],
            )),
        }
    }
}

impl User {
    /// Constructs a new user with freshly generated identifiers.
    pub fn new(email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Profile {
    /// Constructs a new profile for an existing account.
    pub fn new(user_id: String, full_name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            full_name,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` when the profile holds the `Admin` role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// Authenticated account with its profile, resolved once by the auth
/// middleware and passed to handlers and workflows explicitly.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub profile: Profile,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.profile.is_admin()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Credentials submitted by a user attempting to authenticate.
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Authentication token returned after a successful login.
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of a user returned by the API.
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Joined user + profile row for admin listings.
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<&AuthUser> for UserResponse {
    fn from(account: &AuthUser) -> Self {
        UserResponse {
            id: account.user.id.clone(),
            email: account.user.email.clone(),
            full_name: account.profile.full_name.clone(),
            role: account.profile.role.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn user_role_serde_accepts_and_emits_snake_case() {
        let w: UserRole = serde_json::from_str("\"worker\"").unwrap();
        let a: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(matches!(w, UserRole::Worker));
        assert!(matches!(a, UserRole::Admin));

        // Tolerate legacy casings
        let w2: UserRole = serde_json::from_str("\"Worker\"").unwrap();
        let a2: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert!(matches!(w2, UserRole::Worker));
        assert!(matches!(a2, UserRole::Admin));

        let sw = serde_json::to_value(UserRole::Worker).unwrap();
        let sa = serde_json::to_value(UserRole::Admin).unwrap();
        assert_eq!(sw, Value::String("worker".into()));
        assert_eq!(sa, Value::String("admin".into()));
    }

    #[test]
    fn new_user_lowercases_email() {
        let user = User::new("Jane@Example.COM".into(), "hash".into());
        assert_eq!(user.email, "jane@example.com");
    }

    #[test]
    fn auth_user_response_carries_profile_fields() {
        let user = User::new("jane@example.com".into(), "hash".into());
        let profile = Profile::new(user.id.clone(), "Jane Doe".into(), UserRole::Admin);
        let account = AuthUser { user, profile };
        let resp = UserResponse::from(&account);
        assert_eq!(resp.full_name, "Jane Doe");
        assert_eq!(resp.role, "admin");
        assert!(account.is_admin());
    }
}
