use crate::db::DbPool;
use crate::models::{User, UserChanges};
use crate::schema::users;
use anyhow::{Context, Result};
use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Creates a new user in the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `email` - The login email, unique across users
/// * `password_hash` - The bcrypt hash of the user's password
/// * `display_name` - Optional display name
///
/// ### Returns
///
/// A Result containing the newly created User if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The email is already registered (unique constraint violation)
#[instrument(skip(pool, password_hash), fields(email = %email))]
pub fn create_user(pool: &DbPool, email: String, password_hash: String, display_name: Option<String>) -> Result<User> {
    debug!("Creating new user");

    let conn = &mut pool.get()?;
    let new_user = User::new(email, password_hash, display_name);

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)
        .context("Failed to insert user")?;

    info!("Successfully created user with uuid: {}", new_user.get_uuid());

    Ok(new_user)
}

/// Retrieves a user by UUID
#[instrument(skip(pool), fields(uuid = %uuid))]
pub fn get_user(pool: &DbPool, uuid: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .filter(users::uuid.eq(uuid))
        .select(User::as_select())
        .first(conn)
        .optional()?;

    if result.is_none() {
        debug!("User not found");
    }

    Ok(result)
}

/// Retrieves a user by login email
#[instrument(skip(pool), fields(email = %email))]
pub fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .filter(users::email.eq(email))
        .select(User::as_select())
        .first(conn)
        .optional()?;

    Ok(result)
}

/// Applies a partial update to a user's profile
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `uuid` - The UUID of the user to update
/// * `changes` - The fields to change; `None` fields are left untouched
///
/// ### Returns
///
/// A Result containing the updated User if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The user does not exist
/// - The new email belongs to another user (unique constraint violation)
#[instrument(skip(pool, changes), fields(uuid = %uuid))]
pub fn update_user(pool: &DbPool, uuid: &str, mut changes: UserChanges) -> Result<User> {
    debug!("Updating user");

    let conn = &mut pool.get()?;
    changes.updated_at = Some(Utc::now().naive_utc());

    let user = diesel::update(users::table.filter(users::uuid.eq(uuid)))
        .set(&changes)
        .returning(User::as_returning())
        .get_result(conn)
        .context("Failed to update user")?;

    info!("Successfully updated user");

    Ok(user)
}
