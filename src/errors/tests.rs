use super::*;
use axum::body::to_bytes;
use axum::response::IntoResponse;

/// Helper to extract status code and body JSON from an ApiError response
async fn error_response(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_database_error_hides_details() {
    let error = ApiError::Database(anyhow::anyhow!("connection refused"));
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_not_found_response() {
    let error = ApiError::NotFound("Restaurant not found".to_string());
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Restaurant not found");
}

#[tokio::test]
async fn test_bad_request_response() {
    let error = ApiError::BadRequest("Missing required fields".to_string());
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
async fn test_invalid_rating_response() {
    let msg = "Ratings must be numbers between 1 and 10".to_string();
    let error = ApiError::InvalidRating(msg.clone());
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], msg);
}

#[tokio::test]
async fn test_unauthorized_response() {
    let error = ApiError::Unauthorized("Unauthorized".to_string());
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_conflict_response() {
    let error = ApiError::Conflict("Email already registered".to_string());
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_upstream_and_unavailable_responses() {
    let (status, _) = error_response(ApiError::Upstream("Could not geocode city: Atlantis".to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, body) = error_response(ApiError::ServiceUnavailable("Places API key is not configured".to_string())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Places API key is not configured");
}

#[test]
fn test_is_unique_violation_detects_diesel_errors() {
    let unique = anyhow::Error::new(DieselError::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new("UNIQUE constraint failed: users.email".to_string()),
    ))
    .context("Failed to insert user");
    assert!(is_unique_violation(&unique));

    let other = anyhow::Error::new(DieselError::NotFound);
    assert!(!is_unique_violation(&other));
    assert!(!is_unique_violation(&anyhow::anyhow!("plain failure")));
}
