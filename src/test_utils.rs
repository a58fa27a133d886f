use crate::auth::AuthSettings;
use crate::models::{
    Mealtype, NewRestaurant, RatingInput, RatingScores, Restaurant, RestaurantAggregate, RestaurantWithAggregate, User,
};
use crate::*;
use diesel::sql_types::Text;
use diesel::{QueryableByName, RunQueryDsl};
use proptest::prelude::*;
use std::sync::Arc;

/// Sets up a test database with migrations applied
///
/// This function:
/// 1. Creates an in-memory SQLite database
/// 2. Enables foreign key constraints (done by the pool's connection customizer)
/// 3. Runs all migrations to set up the schema
///
/// ### Returns
///
/// An Arc-wrapped database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<db::DbPool> {
    // Plain ":memory:" gives each pooled connection its own database, so each
    // test gets a uniquely named shared-cache database instead.
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).unwrap();

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).unwrap();

    Arc::new(pool)
}

/// Auth settings with a fixed secret and the cheapest bcrypt cost
pub fn test_auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-secret".to_string(),
        token_ttl_minutes: 60,
        bcrypt_cost: 4,
    }
}

/// Application state over a fresh test database, without a Places client
pub fn test_state() -> AppState {
    AppState::new(setup_test_db(), test_auth_settings(), None)
}

/// Inserts a user with a throwaway password hash
pub fn insert_user(pool: &db::DbPool, email: &str) -> User {
    repo::create_user(pool, email.to_string(), "not-a-real-hash".to_string(), None).unwrap()
}

/// A restaurant in Montreal with the given name and cuisine
pub fn montreal_restaurant(name: &str, cuisine: &str) -> NewRestaurant {
    NewRestaurant::new(
        name.to_string(),
        "123 Rue Sainte-Catherine".to_string(),
        vec![cuisine.to_string()],
        45.5017,
        -73.5673,
    )
}

/// A dinner rating by `user_id` with the given scores
pub fn dinner_rating(user_id: &str, service: i32, foodquality: i32, ambiance: i32) -> RatingInput {
    RatingInput {
        user_id: user_id.to_string(),
        scores: RatingScores::new(service, foodquality, ambiance),
        meal: Mealtype::Dinner,
        notes: None,
        visit_date: None,
    }
}

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Tests the setup_test_db function
///
/// This test verifies that:
/// 1. The test database can be created and connected to
/// 2. The database has the expected tables
/// 3. Foreign keys are enforced on pooled connections
#[test]
fn test_setup_test_db() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    let expected_tables = vec![
        "users", "restaurants", "ratings", "restaurant_aggregates",
        "__diesel_schema_migrations",
    ];

    for table in expected_tables {
        assert!(table_names.iter().any(|t| t.name == table), "Table '{}' not found in database", table);
    }

    let orphan = diesel::sql_query(
        "INSERT INTO restaurant_aggregates (restaurant_id, total_ratings, avg_service, avg_foodquality, avg_ambiance, avg_overall, updated_at) \
         VALUES (999, 0, 0, 0, 0, 0, '2025-01-01 00:00:00')",
    )
    .execute(&mut conn);
    assert!(orphan.is_err(), "Foreign keys should be enforced");
}

/// Generates a valid score in 1..=10
pub fn arb_score() -> impl Strategy<Value = i32> {
    1i32..=10
}

/// Generates a score outside 1..=10
pub fn arb_invalid_score() -> impl Strategy<Value = i32> {
    prop_oneof![(-1000i32..=0), (11i32..=1000)]
}

/// Generates a valid triple of scores
pub fn arb_scores() -> impl Strategy<Value = RatingScores> {
    (arb_score(), arb_score(), arb_score())
        .prop_map(|(service, foodquality, ambiance)| RatingScores::new(service, foodquality, ambiance))
}

/// Generates a latitude/longitude pair anywhere on Earth
pub fn arb_coordinates() -> impl Strategy<Value = (f64, f64)> {
    (-90.0f64..=90.0, -180.0f64..=180.0)
}

/// Builds a restaurant with an optional aggregate without touching a database
///
/// `avg_overall` of `None` leaves the restaurant unrated. `created_day` is the
/// day of January 2025 the restaurant was added.
pub fn restaurant_fixture(
    id: i32,
    name: &str,
    cuisine: &[&str],
    position: (f64, f64),
    avg_overall: Option<f64>,
    created_day: u32,
) -> RestaurantWithAggregate {
    let created_at = format!("2025-01-{:02}T12:00:00", created_day);
    let restaurant: Restaurant = serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "address": "1 Main St",
        "cuisine": cuisine,
        "latitude": position.0,
        "longitude": position.1,
        "priceRange": null,
        "phone": null,
        "website": null,
        "photos": [],
        "isActive": true,
        "createdAt": created_at,
        "updatedAt": created_at,
    }))
    .unwrap();

    let aggregate = avg_overall.map(|avg| {
        serde_json::from_value::<RestaurantAggregate>(serde_json::json!({
            "restaurantId": id,
            "totalRatings": 1,
            "avg_service": avg,
            "avg_foodquality": avg,
            "avg_ambiance": avg,
            "avg_overall": avg,
            "updatedAt": created_at,
        }))
        .unwrap()
    });

    RestaurantWithAggregate { restaurant, aggregate }
}
