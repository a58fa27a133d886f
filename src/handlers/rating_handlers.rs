use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::db::DbPool;
use crate::dto::{CreateRatingDto, RatingsQuery};
use crate::errors::{is_unique_violation, ApiError};
use crate::models::{Rating, RatingWithUser};
use crate::repo;

/// Handler for rating an existing restaurant
///
/// This function handles POST requests to `/api/rating`. The restaurant's
/// aggregate is refreshed in the same transaction as the insert.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The restaurant, the user, the three scores and the meal
///
/// ### Returns
///
/// The newly created rating as JSON with a 201 status
///
/// ### Errors
///
/// - 404 if the restaurant or the user does not exist
/// - 409 if the user already rated this restaurant
#[instrument(skip(pool, payload))]
pub async fn create_rating_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateRatingDto>,
) -> Result<(StatusCode, Json<Rating>), ApiError> {
    let (restaurant_id, input) = payload.into_parts().inspect_err(|e| warn!("Rejected rating: {}", e))?;
    info!("Rating restaurant {}", restaurant_id);

    repo::get_restaurant(&pool, restaurant_id)
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".to_string()))?;

    repo::get_user(&pool, &input.user_id)
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let rating = repo::add_rating(&pool, restaurant_id, input).map_err(|e| {
        if is_unique_violation(&e) {
            debug!("Duplicate rating");
            ApiError::Conflict("You have already rated this restaurant".to_string())
        } else {
            ApiError::Database(e)
        }
    })?;

    info!("Successfully created rating with id: {}", rating.get_id());
    Ok((StatusCode::CREATED, Json(rating)))
}

/// Handler for listing the ratings of a restaurant
///
/// This function handles GET requests to `/api/rating?restaurantId=`.
///
/// ### Returns
///
/// The ratings, newest first, each with the rating user's uuid and email
#[instrument(skip(pool))]
pub async fn list_ratings_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the query string parameters
    Query(query): Query<RatingsQuery>,
) -> Result<Json<Vec<RatingWithUser>>, ApiError> {
    let restaurant_id = query.restaurant_id()?;

    let ratings = repo::list_ratings_for_restaurant(&pool, restaurant_id).map_err(ApiError::Database)?;

    info!("Retrieved {} ratings for restaurant {}", ratings.len(), restaurant_id);
    Ok(Json(ratings))
}
