use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{DashboardSummaryDto, RankedRestaurantDto, RankingsQuery, SurpriseDto, SurpriseQuery};
use crate::errors::ApiError;
use crate::ranking;
use crate::repo;

/// Handler for the restaurant rankings
///
/// This function handles GET requests to `/api/rankings`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `query` - `limit` (default 10, at most 100) and `minRatings` (default 1)
///
/// ### Returns
///
/// Rated active restaurants, best first, each with its `rank` and `displayRating`
#[instrument(skip(pool))]
pub async fn rankings_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the query string parameters
    Query(query): Query<RankingsQuery>,
) -> Result<Json<Vec<RankedRestaurantDto>>, ApiError> {
    let restaurants = repo::list_ranked_restaurants(&pool, query.limit(), query.min_ratings())
        .map_err(ApiError::Database)?;

    info!("Ranked {} restaurants", restaurants.len());
    Ok(Json(ranking::rank_by_rating(restaurants)))
}

/// Handler for the dashboard numbers
///
/// This function handles GET requests to `/api/summary`.
#[instrument(skip(pool))]
pub async fn summary_handler(State(pool): State<Arc<DbPool>>) -> Result<Json<DashboardSummaryDto>, ApiError> {
    let restaurants = repo::list_restaurants(&pool).map_err(ApiError::Database)?;

    debug!("Summarizing {} restaurants", restaurants.len());
    Ok(Json(ranking::dashboard_summary(&restaurants)))
}

/// Handler picking a random well-rated restaurant nearby
///
/// This function handles GET requests to `/api/surprise`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `query` - The caller's `latitude` and `longitude`, an optional
///   `distanceKm` (default 20) and an optional `cuisine`
///
/// ### Returns
///
/// How many restaurants matched, and one of the five best of them if any
#[instrument(skip(pool))]
pub async fn surprise_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the query string parameters
    Query(query): Query<SurpriseQuery>,
) -> Result<Json<SurpriseDto>, ApiError> {
    let origin = query.origin()?;
    let max_km = query.distance_km()?;

    let restaurants = repo::list_restaurants(&pool).map_err(ApiError::Database)?;
    let candidates = ranking::surprise_candidates(restaurants, origin, max_km, query.cuisine());
    let surprise = ranking::pick_surprise(candidates, &mut rand::rng());

    info!("Found {} matches for surprise", surprise.match_count);
    Ok(Json(surprise))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_rankings_handler() {
        let pool = setup_test_db();
        let ana = insert_user(&pool, "ana@example.com");
        let bob = insert_user(&pool, "bob@example.com");
        let good = repo::create_restaurant(&pool, montreal_restaurant("Good", "Thai")).unwrap();
        let great = repo::create_restaurant(&pool, montreal_restaurant("Great", "Greek")).unwrap();
        repo::create_restaurant(&pool, montreal_restaurant("Unrated", "Thai")).unwrap();
        repo::add_rating(&pool, good.get_id(), dinner_rating(&ana.get_uuid(), 6, 6, 6)).unwrap();
        repo::add_rating(&pool, great.get_id(), dinner_rating(&ana.get_uuid(), 9, 9, 9)).unwrap();
        repo::add_rating(&pool, great.get_id(), dinner_rating(&bob.get_uuid(), 9, 9, 9)).unwrap();

        let Json(ranked) = rankings_handler(State(pool.clone()), Query(RankingsQuery::default()))
            .await
            .unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].restaurant.restaurant.get_name(), "Great");
        assert_eq!(ranked[0].display_rating, 4.5);
        assert_eq!(ranked[1].restaurant.restaurant.get_name(), "Good");

        let Json(popular) = rankings_handler(
            State(pool.clone()),
            Query(RankingsQuery {
                limit: None,
                min_ratings: Some(2),
            }),
        )
        .await
        .unwrap();
        assert_eq!(popular.len(), 1);
    }

    #[tokio::test]
    async fn test_summary_handler() {
        let pool = setup_test_db();
        let ana = insert_user(&pool, "ana@example.com");
        let rated = repo::create_restaurant(&pool, montreal_restaurant("Rated", "Thai")).unwrap();
        repo::create_restaurant(&pool, montreal_restaurant("Unrated", "Thai")).unwrap();
        repo::add_rating(&pool, rated.get_id(), dinner_rating(&ana.get_uuid(), 8, 8, 8)).unwrap();

        let Json(summary) = summary_handler(State(pool.clone())).await.unwrap();

        assert_eq!(summary.total_restaurants, 2);
        assert_eq!(summary.highest_rated.unwrap().restaurant.get_name(), "Rated");
        assert_eq!(summary.top_restaurants.len(), 2);
        assert_eq!(summary.recently_added.len(), 2);
        // (4 + 0) / 2
        assert_eq!(summary.overall_average_rating, 2.0);
    }

    #[tokio::test]
    async fn test_surprise_handler() {
        let pool = setup_test_db();
        repo::create_restaurant(&pool, montreal_restaurant("Downtown Thai", "Thai")).unwrap();
        repo::create_restaurant(&pool, montreal_restaurant("Downtown Greek", "Greek")).unwrap();

        let Json(surprise) = surprise_handler(
            State(pool.clone()),
            Query(SurpriseQuery {
                latitude: Some(45.5),
                longitude: Some(-73.57),
                cuisine: Some("THAI".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(surprise.match_count, 1);
        let pick = surprise.recommendation.unwrap();
        assert_eq!(pick.restaurant.restaurant.get_name(), "Downtown Thai");
        assert!(pick.distance_km < 1.0);

        let Json(far_away) = surprise_handler(
            State(pool.clone()),
            Query(SurpriseQuery {
                latitude: Some(48.8566),
                longitude: Some(2.3522),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(far_away.match_count, 0);
        assert!(far_away.recommendation.is_none());
    }

    #[tokio::test]
    async fn test_surprise_handler_requires_coordinates() {
        let pool = setup_test_db();

        let result = surprise_handler(State(pool.clone()), Query(SurpriseQuery::default())).await;
        assert!(matches!(result.unwrap_err(), ApiError::BadRequest(_)));

        let result = surprise_handler(
            State(pool.clone()),
            Query(SurpriseQuery {
                latitude: Some(45.5),
                longitude: Some(-73.57),
                distance_km: Some(-1.0),
                cuisine: None,
            }),
        )
        .await;
        assert!(matches!(result.unwrap_err(), ApiError::BadRequest(_)));
    }
}
