use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;

use crate::{
    config::Config,
    models::user::AuthUser,
    repositories::{UserRepository, UserRepositoryTrait},
    utils::jwt::verify_access_token,
};

pub async fn auth(
    State((pool, config)): State<(PgPool, Config)>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let account = authenticate_request(request.headers(), &pool, &config).await?;
    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

// Auth + require admin role for admin-only routes
pub async fn auth_admin(
    State((pool, config)): State<(PgPool, Config)>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let account = authenticate_request(request.headers(), &pool, &config).await?;
    if !account.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }
    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

fn parse_bearer_token(header: &str) -> Option<&str> {
    if let Some(rest) = header.strip_prefix("Bearer ") {
        return Some(rest);
    }
    if let Some(space_idx) = header.find(' ') {
        let (scheme, rest) = header.split_at(space_idx);
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(rest.trim_start());
        }
    }
    None
}

async fn authenticate_request(
    headers: &axum::http::HeaderMap,
    pool: &PgPool,
    config: &Config,
) -> Result<AuthUser, StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer_token)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims =
        verify_access_token(token, &config.jwt_secret).map_err(|_| StatusCode::UNAUTHORIZED)?;

    let users = UserRepository::new();
    let user = users
        .find_by_id(pool, &claims.sub)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let profile = users
        .find_profile_by_user_id(pool, &user.id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(AuthUser { user, profile })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bearer_token_accepts_standard_and_lowercase_schemes() {
        assert_eq!(parse_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer_token("BEARER  abc"), Some("abc"));
    }

    #[test]
    fn parse_bearer_token_rejects_other_schemes() {
        assert_eq!(parse_bearer_token("Basic abc"), None);
        assert_eq!(parse_bearer_token("abc"), None);
    }
}
