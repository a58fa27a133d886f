use crate::db::DbPool;
use crate::models::{AggregateStats, RatingScores, RestaurantAggregate};
use crate::schema::{ratings, restaurant_aggregates};
use anyhow::Result;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, instrument};

/// Recomputes the aggregate row of a restaurant from all of its ratings
///
/// The row is created on first use and overwritten afterwards. This takes a
/// connection rather than the pool so callers can run it inside the same
/// transaction as the rating write that triggered it.
///
/// ### Arguments
///
/// * `conn` - An open connection, usually inside a transaction
/// * `restaurant_id` - The restaurant whose aggregate to refresh
///
/// ### Returns
///
/// A Result containing the stored aggregate
#[instrument(skip(conn), fields(restaurant_id = %restaurant_id))]
pub fn update_restaurant_aggregate(conn: &mut SqliteConnection, restaurant_id: i32) -> Result<RestaurantAggregate> {
    let scores: Vec<RatingScores> = ratings::table
        .filter(ratings::restaurant_id.eq(restaurant_id))
        .select((ratings::rating_service, ratings::rating_foodquality, ratings::rating_ambiance))
        .load::<(i32, i32, i32)>(conn)?
        .into_iter()
        .map(|(service, foodquality, ambiance)| RatingScores::new(service, foodquality, ambiance))
        .collect();

    let aggregate = RestaurantAggregate::new(restaurant_id, AggregateStats::from_scores(&scores));

    diesel::insert_into(restaurant_aggregates::table)
        .values(&aggregate)
        .on_conflict(restaurant_aggregates::restaurant_id)
        .do_update()
        .set(&aggregate)
        .execute(conn)?;

    debug!(
        "Aggregate refreshed: {} ratings, overall {}",
        aggregate.get_total_ratings(),
        aggregate.get_avg_overall()
    );

    Ok(aggregate)
}

/// Retrieves the aggregate row of a restaurant, if it has one
#[instrument(skip(pool), fields(restaurant_id = %restaurant_id))]
pub fn get_restaurant_aggregate(pool: &DbPool, restaurant_id: i32) -> Result<Option<RestaurantAggregate>> {
    let conn = &mut pool.get()?;

    let result = restaurant_aggregates::table
        .filter(restaurant_aggregates::restaurant_id.eq(restaurant_id))
        .select(RestaurantAggregate::as_select())
        .first(conn)
        .optional()?;

    Ok(result)
}
