/// Tablerank: A Restaurant Rating Library
///
/// This library provides the core functionality for rating restaurants,
/// including data models, database access, rankings and a web API.
///
/// Users rate restaurants on service, food quality and ambiance. After each
/// rating, the restaurant's aggregate is recomputed so rankings can be served
/// straight from the `restaurant_aggregates` table.
///
/// ### Modules
///
/// - `auth`: Password hashing, JWT session tokens and the `AuthUser` extractor
/// - `config`: Configuration from defaults, file, environment and flags
/// - `db`: Database connection management
/// - `dto`: Request and response shapes of the web API
/// - `errors`: The API error type and its HTTP mapping
/// - `handlers`: The web API handlers
/// - `logging`: Tracing subscriber setup
/// - `models`: Data structures representing users, restaurants and ratings
/// - `places`: Google Places client used for seeding
/// - `ranking`: Rankings, dashboard summary and surprise recommendations
/// - `repo`: Repository layer for database operations
/// - `schema`: Database schema definitions
/// - `seed`: Seeding restaurants of a city
///
/// ### Web API
///
/// The library exposes a JSON API using Axum with the following endpoints:
///
/// - `POST /api/auth/register`, `POST /api/auth/login`, `POST /api/auth/logout`
/// - `GET /api/auth/me`, `POST /api/auth/verify`
/// - `POST /api/update-user`: Update the caller's profile
/// - `GET|POST /api/restaurants`: List restaurants, or add one with a first rating
/// - `GET /api/restaurants/{id}`: A restaurant with its ratings
/// - `GET|POST /api/rating`: List or add ratings
/// - `GET /api/rankings`, `GET /api/summary`, `GET /api/surprise`
/// - `GET|POST /api/admin/seed-restaurants`: Seed restaurants from Google Places

/// Authentication module
pub mod auth;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Data transfer objects module
pub mod dto;

/// Errors module
pub mod errors;

/// Handlers module
pub mod handlers;

/// Logging module
pub mod logging;

/// Data models module
pub mod models;

/// Google Places client module
pub mod places;

/// Rankings module
pub mod ranking;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Seeding module
pub mod seed;

#[cfg(test)]
pub mod test_utils;

use anyhow::anyhow;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::AuthSettings;
use crate::handlers::*;
use crate::places::PlacesClient;

/// Shared state of every request handler
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    pub auth: AuthSettings,
    /// Absent when no Google Maps API key is configured
    pub places: Option<Arc<PlacesClient>>,
}

impl AppState {
    pub fn new(pool: Arc<db::DbPool>, auth: AuthSettings, places: Option<PlacesClient>) -> Self {
        Self {
            pool,
            auth,
            places: places.map(Arc::new),
        }
    }
}

impl FromRef<AppState> for Arc<db::DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for AuthSettings {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// This function sets up the Axum router with all the API endpoints.
///
/// ### Arguments
///
/// * `state` - The database pool, auth settings and optional Places client
///   shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes, CORS and request tracing
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Session routes
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/me", get(me_handler))
        .route("/api/auth/verify", post(verify_handler))
        // Profile of the authenticated user
        .route("/api/update-user", post(update_user_handler))
        // Restaurants, optionally filtered to those a user rated
        .route("/api/restaurants", get(list_restaurants_handler).post(create_restaurant_handler))
        .route("/api/restaurants/{id}", get(get_restaurant_handler))
        // Ratings
        .route("/api/rating", get(list_ratings_handler).post(create_rating_handler))
        // Derived views
        .route("/api/rankings", get(rankings_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/surprise", get(surprise_handler))
        // Seeding from Google Places
        .route(
            "/api/admin/seed-restaurants",
            get(seed_status_handler).post(seed_restaurants_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the embedded migrations
///
/// This function applies all pending database migrations to set up the schema.
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Errors
///
/// Returns an error if any migration fails to apply
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    Ok(())
}
