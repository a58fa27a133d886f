//! Common test utilities for tablerank integration tests
//!
//! This file contains shared functions and utilities for all integration tests,
//! including test application setup and helpers that create users and
//! restaurants through the API.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tablerank::{auth::AuthSettings, create_app, db::init_pool, run_migrations, AppState};
use tower::ServiceExt;

/// Creates a test application with an in-memory SQLite database
///
/// Every call gets its own uniquely named shared-cache database, so tests are
/// isolated from each other and need no cleanup. No Places client is
/// configured.
///
/// ### Returns
///
/// An Axum Router configured with all routes
pub fn create_test_app() -> Router {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url).unwrap());

    let conn = &mut pool.get().unwrap();
    run_migrations(conn).unwrap();

    let auth = AuthSettings {
        jwt_secret: "integration-secret".to_string(),
        token_ttl_minutes: 60,
        bcrypt_cost: 4,
    };

    create_app(AppState::new(pool.clone(), auth, None))
}

/// A response reduced to what the tests look at
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `error` message of an error body
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// The value of the `authToken` cookie set by this response, if any
    pub fn auth_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|cookie| cookie.strip_prefix("authToken="))
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
    }
}

/// Sends a request to the app and parses the JSON body (Null if empty)
///
/// ### Arguments
///
/// * `app` - The test application
/// * `method` - The HTTP method
/// * `uri` - Path and query string
/// * `body` - Optional JSON body
/// * `headers` - Extra headers such as `Cookie` or `Authorization`
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    headers: &[(header::HeaderName, String)],
) -> TestResponse {
    let mut builder = Request::builder().uri(uri).method(method);
    for (name, value) in headers {
        builder = builder.header(name, value);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse { status, headers, body }
}

/// Sends a GET request without a body
pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, None, &[]).await
}

/// Sends a POST request with a JSON body
pub async fn post(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::POST, uri, Some(body), &[]).await
}

/// Registers a user via the API and returns its uuid
pub async fn register_user(app: &Router, email: &str, password: &str) -> String {
    let response = post(
        app,
        "/api/auth/register",
        json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["uuid"].as_str().unwrap().to_string()
}

/// Logs in via the API and returns the session token
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = post(app, "/api/auth/login", json!({ "email": email, "password": password })).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    response.auth_cookie().expect("login should set the authToken cookie")
}

/// The body of a valid `POST /api/restaurants` request
pub fn restaurant_payload(user_id: &str, name: &str, scores: (i32, i32, i32)) -> Value {
    json!({
        "userId": user_id,
        "name": name,
        "address": "100 Boulevard Saint-Laurent",
        "cuisine": ["Italian"],
        "latitude": 45.5088,
        "longitude": -73.5617,
        "meal": "Dinner",
        "rating_service": scores.0,
        "rating_foodquality": scores.1,
        "rating_ambiance": scores.2
    })
}

/// Creates a restaurant with a first rating via the API and returns its id
pub async fn create_restaurant(app: &Router, user_id: &str, name: &str, scores: (i32, i32, i32)) -> i64 {
    let response = post(app, "/api/restaurants", restaurant_payload(user_id, name, scores)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["id"].as_i64().unwrap()
}

/// Rates an existing restaurant via the API
pub async fn rate(app: &Router, restaurant_id: i64, user_id: &str, scores: (i32, i32, i32)) -> TestResponse {
    post(
        app,
        "/api/rating",
        json!({
            "restaurantId": restaurant_id,
            "userId": user_id,
            "rating_service": scores.0,
            "rating_foodquality": scores.1,
            "rating_ambiance": scores.2,
            "meal": "Lunch"
        }),
    )
    .await
}
