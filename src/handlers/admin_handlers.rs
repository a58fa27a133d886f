use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::dto::{SeedDto, SeedResultDto};
use crate::errors::ApiError;
use crate::seed;
use crate::AppState;

/// Handler telling clients the seed endpoint exists
///
/// This function handles GET requests to `/api/admin/seed-restaurants`.
pub async fn seed_status_handler() -> Json<Value> {
    Json(json!({ "message": "Seed restaurants endpoint is available" }))
}

/// Handler for seeding restaurants of a city from Google Places
///
/// This function handles POST requests to `/api/admin/seed-restaurants`.
///
/// ### Arguments
///
/// * `state` - The application state; seeding needs its Places client
/// * `payload` - The `city` and an optional `limit` (default 50)
///
/// ### Returns
///
/// How many restaurants were inserted and how many failed
///
/// ### Errors
///
/// - 503 if no Google Maps API key is configured
/// - 502 if the city cannot be geocoded or the Places API fails
#[instrument(skip(state, payload))]
pub async fn seed_restaurants_handler(
    // Extract the whole state, including the optional Places client
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<SeedDto>,
) -> Result<Json<SeedResultDto>, ApiError> {
    let (city, limit) = payload.into_parts()?;

    let places = state
        .places
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("GOOGLE_MAPS_API_KEY is not configured".to_string()))?;

    info!("Seeding up to {} restaurants for {}", limit, city);

    let report = seed::seed_restaurants_for_city(&state.pool, &places, &city, limit)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(SeedResultDto {
        success: true,
        message: format!("Successfully seeded restaurants for {}", city),
        inserted: report.inserted,
        failed: report.failed,
    }))
}
