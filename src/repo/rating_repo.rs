use crate::db::DbPool;
use crate::models::{NewRating, Rating, RatingInput, RatingWithUser, UserSummary};
use crate::schema::{ratings, users};
use anyhow::{Context, Result};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::aggregate_repo::update_restaurant_aggregate;

/// Records a rating and refreshes the restaurant's aggregate
///
/// The insert and the aggregate refresh run in one transaction, so the
/// aggregate always reflects every stored rating.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `restaurant_id` - The rated restaurant
/// * `input` - The rating's user, scores and meal
///
/// ### Returns
///
/// A Result containing the stored Rating
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The user already rated this restaurant (unique constraint violation)
/// - The restaurant or user does not exist (foreign key violation)
#[instrument(skip(pool, input), fields(restaurant_id = %restaurant_id, user_id = %input.user_id))]
pub fn add_rating(pool: &DbPool, restaurant_id: i32, input: RatingInput) -> Result<Rating> {
    debug!("Recording rating");

    let conn = &mut pool.get()?;

    let rating = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let rating = diesel::insert_into(ratings::table)
            .values(NewRating::new(restaurant_id, input))
            .returning(Rating::as_returning())
            .get_result(conn)
            .context("Failed to insert rating")?;

        update_restaurant_aggregate(conn, restaurant_id)?;

        Ok(rating)
    })?;

    info!("Successfully recorded rating with id: {}", rating.get_id());

    Ok(rating)
}

/// Lists every rating of a restaurant with the rating user's public details
///
/// Newest ratings come first.
#[instrument(skip(pool), fields(restaurant_id = %restaurant_id))]
pub fn list_ratings_for_restaurant(pool: &DbPool, restaurant_id: i32) -> Result<Vec<RatingWithUser>> {
    let conn = &mut pool.get()?;

    let rows = ratings::table
        .inner_join(users::table)
        .filter(ratings::restaurant_id.eq(restaurant_id))
        .order((ratings::created_at.desc(), ratings::id.desc()))
        .select((Rating::as_select(), (users::uuid, users::email)))
        .load::<(Rating, UserSummary)>(conn)?;

    debug!("Loaded {} ratings", rows.len());

    Ok(rows
        .into_iter()
        .map(|(rating, user)| RatingWithUser { rating, user })
        .collect())
}

/// Lists every rating a user has given, newest first
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn list_ratings_for_user(pool: &DbPool, user_id: &str) -> Result<Vec<Rating>> {
    let conn = &mut pool.get()?;

    let result = ratings::table
        .filter(ratings::user_id.eq(user_id))
        .order((ratings::created_at.desc(), ratings::id.desc()))
        .select(Rating::as_select())
        .load(conn)?;

    Ok(result)
}
