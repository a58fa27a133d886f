//! Rankings, the home page summary and the "surprise me" recommendation.
//!
//! Everything here is a pure function over already loaded restaurants, so
//! handlers load once and these shape the response.

use std::cmp::Ordering;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::dto::{DashboardSummaryDto, RankedRestaurantDto, RecommendationDto, SurpriseDto};
use crate::models::{round2, RestaurantWithAggregate};

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// How many of the best matches the surprise pick chooses from
pub const SURPRISE_POOL_SIZE: usize = 5;

/// Number of entries in each dashboard list
pub const DASHBOARD_LIST_SIZE: usize = 3;

/// Great-circle distance between two `(latitude, longitude)` points in km
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards against rounding pushing h slightly past 1
    let h = h.clamp(0.0, 1.0);

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

fn by_display_rating_desc(a: &RestaurantWithAggregate, b: &RestaurantWithAggregate) -> Ordering {
    b.display_rating().partial_cmp(&a.display_rating()).unwrap_or(Ordering::Equal)
}

/// Numbers the already ordered restaurants from 1
pub fn rank_by_rating(restaurants: Vec<RestaurantWithAggregate>) -> Vec<RankedRestaurantDto> {
    restaurants
        .into_iter()
        .enumerate()
        .map(|(index, restaurant)| RankedRestaurantDto {
            rank: index + 1,
            display_rating: round2(restaurant.display_rating()),
            restaurant,
        })
        .collect()
}

/// Builds the home page summary over all active restaurants
///
/// Unrated restaurants count with a rating of 0, both when picking the
/// highest rated and in the overall average.
pub fn dashboard_summary(restaurants: &[RestaurantWithAggregate]) -> DashboardSummaryDto {
    let mut by_rating = restaurants.to_vec();
    // Stable sort keeps the listing order among equal ratings
    by_rating.sort_by(by_display_rating_desc);

    let mut by_age = restaurants.to_vec();
    by_age.sort_by(|a, b| {
        b.restaurant
            .get_created_at()
            .cmp(&a.restaurant.get_created_at())
            .then_with(|| b.restaurant.get_id().cmp(&a.restaurant.get_id()))
    });

    let overall_average_rating = if restaurants.is_empty() {
        0.0
    } else {
        let total: f64 = restaurants.iter().map(RestaurantWithAggregate::display_rating).sum();
        round2(total / restaurants.len() as f64)
    };

    DashboardSummaryDto {
        total_restaurants: restaurants.len(),
        highest_rated: by_rating.first().cloned(),
        top_restaurants: by_rating.into_iter().take(DASHBOARD_LIST_SIZE).collect(),
        recently_added: by_age.into_iter().take(DASHBOARD_LIST_SIZE).collect(),
        overall_average_rating,
    }
}

/// Restaurants within `max_km` of `origin` serving `cuisine`, best rated first
///
/// Each candidate carries its distance from `origin`. `None` for `cuisine`
/// matches every restaurant.
pub fn surprise_candidates(
    restaurants: Vec<RestaurantWithAggregate>,
    origin: (f64, f64),
    max_km: f64,
    cuisine: Option<&str>,
) -> Vec<RecommendationDto> {
    let mut candidates: Vec<RecommendationDto> = restaurants
        .into_iter()
        .filter(|r| cuisine.is_none_or(|c| r.restaurant.serves(c)))
        .filter_map(|restaurant| {
            let position = (restaurant.restaurant.get_latitude(), restaurant.restaurant.get_longitude());
            let distance_km = haversine_km(origin, position);
            (distance_km <= max_km).then(|| RecommendationDto {
                restaurant,
                distance_km: round2(distance_km),
            })
        })
        .collect();

    candidates.sort_by(|a, b| by_display_rating_desc(&a.restaurant, &b.restaurant));
    candidates
}

/// Picks one of the best `SURPRISE_POOL_SIZE` candidates uniformly at random
pub fn pick_surprise<R: Rng + ?Sized>(candidates: Vec<RecommendationDto>, rng: &mut R) -> SurpriseDto {
    let match_count = candidates.len();
    let pool = &candidates[..match_count.min(SURPRISE_POOL_SIZE)];

    SurpriseDto {
        match_count,
        recommendation: pool.choose(rng).cloned(),
    }
}
