use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::auth::{bearer_token, verify_password, AuthSettings, AuthUser, AUTH_COOKIE};
use crate::db::DbPool;
use crate::dto::{LoginDto, RegisterDto, UpdateUserDto};
use crate::errors::{is_unique_violation, ApiError};
use crate::models::User;
use crate::repo;

fn email_taken() -> ApiError {
    ApiError::Conflict("Email already registered".to_string())
}

/// Handler for registering a new user
///
/// This function handles POST requests to `/api/auth/register`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `auth` - Password hashing settings
/// * `payload` - The email, password and optional display name
///
/// ### Returns
///
/// The newly created user as JSON with a 201 status
#[instrument(skip(pool, auth, payload), fields(email = %payload.email))]
pub async fn register_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the token and password settings
    State(auth): State<AuthSettings>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<RegisterDto>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    info!("Registering new user");

    payload.validate()?;
    let email = payload.email.trim().to_string();

    if repo::get_user_by_email(&pool, &email).map_err(ApiError::Database)?.is_some() {
        warn!("Email already registered");
        return Err(email_taken());
    }

    let password_hash = auth.hash_password(&payload.password).map_err(ApiError::Database)?;
    let display_name = payload.display_name.filter(|name| !name.trim().is_empty());

    let user = repo::create_user(&pool, email, password_hash, display_name).map_err(|e| {
        if is_unique_violation(&e) { email_taken() } else { ApiError::Database(e) }
    })?;

    info!("Successfully registered user with uuid: {}", user.get_uuid());
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for logging in
///
/// This function handles POST requests to `/api/auth/login`. On success the
/// session token is set in the `authToken` cookie.
///
/// ### Errors
///
/// Unknown emails and wrong passwords both give `400 Invalid credentials`.
#[instrument(skip(pool, auth, jar, payload), fields(email = %payload.email))]
pub async fn login_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the token and password settings
    State(auth): State<AuthSettings>,
    // Cookies of the request; the session cookie is added to it
    jar: CookieJar,
    // Extract and deserialize the JSON request body
    Json(payload): Json<LoginDto>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let invalid = || ApiError::BadRequest("Invalid credentials".to_string());

    let user = repo::get_user_by_email(&pool, payload.email.trim())
        .map_err(ApiError::Database)?
        .ok_or_else(|| {
            debug!("No user with this email");
            invalid()
        })?;

    if !verify_password(&payload.password, user.get_password_hash()) {
        debug!("Wrong password");
        return Err(invalid());
    }

    let token = auth.sign_token(&user).map_err(ApiError::Database)?;

    info!("User {} logged in", user.get_uuid());
    Ok((jar.add(auth.session_cookie(token)), Json(json!({ "message": "Login successful" }))))
}

/// Handler for logging out
///
/// This function handles POST requests to `/api/auth/logout` by expiring the
/// session cookie.
#[instrument(skip(jar))]
pub async fn logout_handler(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, Json(json!({ "message": "Logged out" })))
}

/// Handler returning the claims of the session cookie
///
/// This function handles GET requests to `/api/auth/me`. Only the cookie is
/// looked at; bearer tokens go through `/api/auth/verify`.
#[instrument(skip(auth, jar))]
pub async fn me_handler(State(auth): State<AuthSettings>, jar: CookieJar) -> Result<Json<Value>, ApiError> {
    let token = jar
        .get(AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("No auth token".to_string()))?;

    let claims = auth.verify_token(&token).map_err(|e| {
        debug!("Rejected session cookie: {:#}", e);
        ApiError::Unauthorized("Unauthorized".to_string())
    })?;

    Ok(Json(json!({ "message": "Authenticated", "user": claims })))
}

/// Handler verifying a bearer token
///
/// This function handles POST requests to `/api/auth/verify`.
///
/// ### Returns
///
/// `{"user": {"uuid", "email"}}` taken from the token's claims
#[instrument(skip(auth, headers))]
pub async fn verify_handler(State(auth): State<AuthSettings>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Authorization header missing or malformed".to_string()))?;

    let claims = auth.verify_token(token).map_err(|e| {
        debug!("Rejected bearer token: {:#}", e);
        ApiError::Unauthorized("Unauthorized".to_string())
    })?;

    Ok(Json(json!({ "user": { "uuid": claims.uuid, "email": claims.email } })))
}

/// Handler for updating the caller's profile
///
/// This function handles POST requests to `/api/update-user`. Absent fields
/// stay unchanged; a new password is hashed before it is stored.
#[instrument(skip(pool, auth, user, payload), fields(uuid = %user.get_uuid()))]
pub async fn update_user_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the token and password settings
    State(auth): State<AuthSettings>,
    // The authenticated caller
    AuthUser(user): AuthUser,
    // Extract and deserialize the JSON request body
    Json(payload): Json<UpdateUserDto>,
) -> Result<Json<Value>, ApiError> {
    debug!("Updating user profile");

    let changes = payload.into_changes(|password| auth.hash_password(password).map_err(ApiError::Database))?;

    let updated = repo::update_user(&pool, &user.get_uuid(), changes).map_err(|e| {
        if is_unique_violation(&e) { email_taken() } else { ApiError::Database(e) }
    })?;

    info!("Updated user {}", updated.get_uuid());
    Ok(Json(json!({ "success": true, "user": updated })))
}
