use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access-token claims. `sub` carries the user id; `jti` keeps every token
/// distinct even across back-to-back logins.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

pub fn create_access_token(
    user_id: String,
    email: String,
    role: String,
    secret: &str,
    expiration_hours: u64,
) -> anyhow::Result<String> {
    let issued = Utc::now();
    let claims = Claims {
        sub: user_id,
        email,
        role,
        exp: (issued + Duration::hours(expiration_hours as i64)).timestamp(),
        iat: issued.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

pub fn verify_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(secret: &str) -> String {
        create_access_token(
            "user-123".into(),
            "jane@example.com".into(),
            "worker".into(),
            secret,
            1,
        )
        .expect("token issued")
    }

    #[test]
    fn roundtrip_preserves_identity_claims() {
        let claims = verify_access_token(&issue("secret"), "secret").expect("verify");
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.role, "worker");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        assert!(verify_access_token(&issue("secret"), "other-secret").is_err());
    }

    #[test]
    fn consecutive_logins_get_distinct_tokens() {
        assert_ne!(issue("secret"), issue("secret"));
    }
}
