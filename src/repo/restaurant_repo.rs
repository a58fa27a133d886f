use std::collections::HashMap;

use crate::db::DbPool;
use crate::models::{
    NewRating, NewRestaurant, RatedRestaurant, Rating, RatingInput, Restaurant, RestaurantAggregate,
    RestaurantWithAggregate, RestaurantWithUserRating,
};
use crate::schema::{ratings, restaurant_aggregates, restaurants};
use anyhow::{Context, Result};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::aggregate_repo::update_restaurant_aggregate;
use super::rating_repo::list_ratings_for_user;

/// Creates a new restaurant without any rating
///
/// No aggregate row is written; the restaurant counts as unrated until its
/// first rating arrives.
#[instrument(skip(pool, new_restaurant), fields(name = %new_restaurant.name))]
pub fn create_restaurant(pool: &DbPool, new_restaurant: NewRestaurant) -> Result<Restaurant> {
    let conn = &mut pool.get()?;

    let restaurant = diesel::insert_into(restaurants::table)
        .values(&new_restaurant)
        .returning(Restaurant::as_returning())
        .get_result(conn)
        .context("Failed to insert restaurant")?;

    info!("Successfully created restaurant with id: {}", restaurant.get_id());

    Ok(restaurant)
}

/// Creates a restaurant together with its creator's first rating
///
/// The restaurant row, the rating row and the aggregate refresh run in one
/// transaction; if any step fails nothing is stored.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `new_restaurant` - The restaurant to insert
/// * `input` - The creator's rating of it
///
/// ### Returns
///
/// A Result containing the restaurant with the stored rating as `userRating`
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The rating's user does not exist (foreign key violation)
/// - Any insert fails
#[instrument(skip(pool, new_restaurant, input), fields(name = %new_restaurant.name, user_id = %input.user_id))]
pub fn create_restaurant_with_rating(
    pool: &DbPool,
    new_restaurant: NewRestaurant,
    input: RatingInput,
) -> Result<RestaurantWithUserRating> {
    let conn = &mut pool.get()?;

    let created = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let restaurant = diesel::insert_into(restaurants::table)
            .values(&new_restaurant)
            .returning(Restaurant::as_returning())
            .get_result(conn)
            .context("Failed to insert restaurant")?;

        debug!("Inserted restaurant with id: {}", restaurant.get_id());

        let user_rating = diesel::insert_into(ratings::table)
            .values(NewRating::new(restaurant.get_id(), input))
            .returning(Rating::as_returning())
            .get_result(conn)
            .context("Failed to insert rating")?;

        update_restaurant_aggregate(conn, restaurant.get_id())?;

        Ok(RestaurantWithUserRating { restaurant, user_rating })
    })?;

    info!("Successfully created restaurant with id: {}", created.restaurant.get_id());

    Ok(created)
}

/// Retrieves an active restaurant with its aggregate
///
/// Inactive restaurants are treated as missing.
#[instrument(skip(pool), fields(restaurant_id = %restaurant_id))]
pub fn get_restaurant(pool: &DbPool, restaurant_id: i32) -> Result<Option<RestaurantWithAggregate>> {
    let conn = &mut pool.get()?;

    let result = restaurants::table
        .left_join(restaurant_aggregates::table)
        .filter(restaurants::id.eq(restaurant_id))
        .filter(restaurants::is_active.eq(true))
        .select((Restaurant::as_select(), Option::<RestaurantAggregate>::as_select()))
        .first::<(Restaurant, Option<RestaurantAggregate>)>(conn)
        .optional()?;

    if result.is_none() {
        debug!("Restaurant not found");
    }

    Ok(result.map(RestaurantWithAggregate::from))
}

/// Lists all active restaurants with their aggregates, ordered by ID
#[instrument(skip(pool))]
pub fn list_restaurants(pool: &DbPool) -> Result<Vec<RestaurantWithAggregate>> {
    let conn = &mut pool.get()?;

    let rows = restaurants::table
        .left_join(restaurant_aggregates::table)
        .filter(restaurants::is_active.eq(true))
        .order(restaurants::id.asc())
        .select((Restaurant::as_select(), Option::<RestaurantAggregate>::as_select()))
        .load::<(Restaurant, Option<RestaurantAggregate>)>(conn)?;

    debug!("Loaded {} restaurants", rows.len());

    Ok(rows.into_iter().map(RestaurantWithAggregate::from).collect())
}

/// Lists the restaurants a user has rated, each with that user's ratings
///
/// Unlike the public listing this includes inactive restaurants, so a user
/// can always see their own history.
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn list_restaurants_rated_by_user(pool: &DbPool, user_id: &str) -> Result<Vec<RatedRestaurant>> {
    let user_ratings = list_ratings_for_user(pool, user_id)?;

    let mut by_restaurant: HashMap<i32, Vec<Rating>> = HashMap::new();
    for rating in user_ratings {
        by_restaurant.entry(rating.get_restaurant_id()).or_default().push(rating);
    }

    if by_restaurant.is_empty() {
        return Ok(Vec::new());
    }

    let conn = &mut pool.get()?;
    let ids: Vec<i32> = by_restaurant.keys().copied().collect();
    let rows = restaurants::table
        .left_join(restaurant_aggregates::table)
        .filter(restaurants::id.eq_any(ids))
        .order(restaurants::id.asc())
        .select((Restaurant::as_select(), Option::<RestaurantAggregate>::as_select()))
        .load::<(Restaurant, Option<RestaurantAggregate>)>(conn)?;

    let rated = rows
        .into_iter()
        .map(|(restaurant, aggregate)| {
            let ratings = by_restaurant.remove(&restaurant.get_id()).unwrap_or_default();
            RatedRestaurant { restaurant, aggregate, ratings }
        })
        .collect::<Vec<_>>();

    debug!("User has rated {} restaurants", rated.len());

    Ok(rated)
}

/// Lists active restaurants with at least `min_ratings` ratings, best first
///
/// Ordered by overall average (descending), then number of ratings
/// (descending), then name. Restaurants without an aggregate row are never
/// included, even when `min_ratings` is 0.
#[instrument(skip(pool))]
pub fn list_ranked_restaurants(pool: &DbPool, limit: i64, min_ratings: i32) -> Result<Vec<RestaurantWithAggregate>> {
    let conn = &mut pool.get()?;

    let rows = restaurants::table
        .inner_join(restaurant_aggregates::table)
        .filter(restaurants::is_active.eq(true))
        .filter(restaurant_aggregates::total_ratings.gt(0))
        .filter(restaurant_aggregates::total_ratings.ge(min_ratings))
        .order((
            restaurant_aggregates::avg_overall.desc(),
            restaurant_aggregates::total_ratings.desc(),
            restaurants::name.asc(),
        ))
        .limit(limit)
        .select((Restaurant::as_select(), RestaurantAggregate::as_select()))
        .load::<(Restaurant, RestaurantAggregate)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(restaurant, aggregate)| RestaurantWithAggregate {
            restaurant,
            aggregate: Some(aggregate),
        })
        .collect())
}
