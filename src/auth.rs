//! Authentication: password hashing, JWT session tokens and the request
//! extractor that resolves the calling user.
use anyhow::{Context, Result};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ApiError;
use crate::models::User;
use crate::{repo, AppState};

/// Name of the cookie carrying the session token
pub const AUTH_COOKIE: &str = "authToken";

/// Secrets and costs used to issue and check credentials
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
}

/// Payload of a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uuid: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl AuthSettings {
    /// Signs an HS256 token for `user`, valid for the configured lifetime
    pub fn sign_token(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            uuid: user.get_uuid(),
            email: user.get_email(),
            iat: now,
            exp: now + self.token_ttl_minutes * 60,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .context("Failed to sign token")
    }

    /// Checks the signature and expiry of `token` and returns its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .context("Invalid token")?;
        Ok(data.claims)
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost).context("Failed to hash password")
    }

    /// Builds the session cookie for `token`
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE, token))
            .http_only(true)
            .path("/")
            .max_age(time::Duration::minutes(self.token_ttl_minutes))
            .same_site(SameSite::Lax)
            .build()
    }
}

/// Compares `password` with a stored bcrypt hash; malformed hashes never match
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Extracts the token of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Extracts the session token from the `authToken` cookie
pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// The authenticated caller of a request
///
/// Resolved from a bearer token, falling back to the session cookie. The
/// token's user must still exist.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .map(str::to_string)
            .or_else(|| cookie_token(&parts.headers))
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

        let claims = state.auth.verify_token(&token).map_err(|e| {
            debug!("Rejected token: {:#}", e);
            ApiError::Unauthorized("Unauthorized".to_string())
        })?;

        let user = repo::get_user(&state.pool, &claims.uuid)
            .map_err(ApiError::Database)?
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

        Ok(AuthUser(user))
    }
}
