use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::db::DbPool;
use crate::dto::{CreateRestaurantDto, RestaurantsQuery};
use crate::errors::ApiError;
use crate::models::{RestaurantDetail, RestaurantWithUserRating};
use crate::repo;

/// Parses a restaurant ID taken from the URL
pub(crate) fn parse_restaurant_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid restaurant ID".to_string()))
}

/// Handler for listing restaurants
///
/// This function handles GET requests to `/api/restaurants`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `query` - With `userId`, only the restaurants that user rated are listed,
///   each with the user's ratings attached
///
/// ### Returns
///
/// A list of restaurants with their aggregates as JSON
#[instrument(skip(pool))]
pub async fn list_restaurants_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the query string parameters
    Query(query): Query<RestaurantsQuery>,
) -> Result<Response, ApiError> {
    let user_id = query.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty());

    let response = match user_id {
        Some(user_id) => {
            debug!("Listing restaurants rated by user {}", user_id);
            let restaurants = repo::list_restaurants_rated_by_user(&pool, user_id).map_err(ApiError::Database)?;
            info!("Retrieved {} rated restaurants", restaurants.len());
            Json(restaurants).into_response()
        }
        None => {
            debug!("Listing all restaurants");
            let restaurants = repo::list_restaurants(&pool).map_err(ApiError::Database)?;
            info!("Retrieved {} restaurants", restaurants.len());
            Json(restaurants).into_response()
        }
    };

    Ok(response)
}

/// Handler for adding a restaurant together with its first rating
///
/// This function handles POST requests to `/api/restaurants`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The restaurant fields plus the creator's scores and meal
///
/// ### Returns
///
/// The restaurant with the creator's rating as `userRating`, with a 201 status
#[instrument(skip(pool, payload))]
pub async fn create_restaurant_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateRestaurantDto>,
) -> Result<(StatusCode, Json<RestaurantWithUserRating>), ApiError> {
    info!("Creating new restaurant");

    let (new_restaurant, rating) = payload.into_parts().inspect_err(|e| warn!("Rejected restaurant: {}", e))?;

    repo::get_user(&pool, &rating.user_id)
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let created = repo::create_restaurant_with_rating(&pool, new_restaurant, rating).map_err(ApiError::Database)?;

    info!("Successfully created restaurant with id: {}", created.restaurant.get_id());
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for getting a restaurant with all of its ratings
///
/// This function handles GET requests to `/api/restaurants/{id}`.
///
/// ### Returns
///
/// `{restaurant, ratings}`, with the ratings newest first
#[instrument(skip(pool), fields(restaurant_id = %id))]
pub async fn get_restaurant_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the restaurant ID from the URL path
    Path(id): Path<String>,
) -> Result<Json<RestaurantDetail>, ApiError> {
    let restaurant_id = parse_restaurant_id(&id)?;

    let restaurant = repo::get_restaurant(&pool, restaurant_id)
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Restaurant not found".to_string()))?;

    let ratings = repo::list_ratings_for_restaurant(&pool, restaurant_id).map_err(ApiError::Database)?;

    debug!("Restaurant {} has {} ratings", restaurant_id, ratings.len());
    Ok(Json(RestaurantDetail { restaurant, ratings }))
}
