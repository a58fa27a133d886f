use tracing::{error, info, instrument};

use crate::db::DbPool;
use crate::models::NewRestaurant;
use crate::places::{PlacesClient, PlacesError};
use crate::repo;

/// Counts of a seeding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub inserted: usize,
    pub failed: usize,
}

/// Inserts each restaurant on its own, logging and counting failures
///
/// One bad row never stops the rest from being inserted.
pub fn insert_restaurants(pool: &DbPool, restaurants: Vec<NewRestaurant>) -> SeedReport {
    let mut report = SeedReport::default();

    for restaurant in restaurants {
        let name = restaurant.name.clone();
        match repo::create_restaurant(pool, restaurant) {
            Ok(_) => {
                info!("Added: {}", name);
                report.inserted += 1;
            }
            Err(e) => {
                error!("Failed to add {}: {:#}", name, e);
                report.failed += 1;
            }
        }
    }

    report
}

/// Fetches up to `limit` restaurants of `city` from Google Places and stores them
///
/// ### Errors
///
/// Returns an error if the city cannot be geocoded or the Places API fails.
/// Failures to insert single restaurants are only counted.
#[instrument(skip(pool, places))]
pub async fn seed_restaurants_for_city(
    pool: &DbPool,
    places: &PlacesClient,
    city: &str,
    limit: usize,
) -> Result<SeedReport, PlacesError> {
    info!("Seeding restaurants for city: {}", city);

    let restaurants = places.fetch_city_restaurants(city, limit).await?;
    info!("Found {} restaurants, inserting", restaurants.len());

    let report = insert_restaurants(pool, restaurants);

    info!(
        "Finished seeding {}: {} inserted, {} failed",
        city, report.inserted, report.failed
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{montreal_restaurant, setup_test_db};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_insert_restaurants_counts_failures() {
        let pool = setup_test_db();
        let mut broken = montreal_restaurant("Broken", "Thai");
        // SQLite binds NaN as NULL, which the NOT NULL latitude rejects
        broken.latitude = f64::NAN;

        let report = insert_restaurants(
            &pool,
            vec![montreal_restaurant("Good", "Thai"), broken, montreal_restaurant("Also Good", "Greek")],
        );

        assert_eq!(report.inserted + report.failed, 3);
        assert!(report.inserted >= 2);
        assert_eq!(repo::list_restaurants(&pool).unwrap().len(), report.inserted);
    }

    #[tokio::test]
    async fn test_seed_restaurants_for_city() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/geocode/json");
                then.status(200).json_body(json!({
                    "status": "OK",
                    "results": [{ "geometry": { "location": { "lat": 45.5, "lng": -73.6 } } }]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/place/nearbysearch/json");
                then.status(200).json_body(json!({
                    "status": "OK",
                    "results": [
                        {
                            "name": "Trattoria",
                            "vicinity": "12 Rue Dante",
                            "geometry": { "location": { "lat": 45.53, "lng": -73.61 } },
                            "types": ["italian_restaurant", "restaurant"]
                        },
                        {
                            "name": "Corner Spot",
                            "vicinity": "3 Av. du Parc",
                            "geometry": { "location": { "lat": 45.51, "lng": -73.58 } },
                            "types": ["restaurant"]
                        }
                    ]
                }));
            })
            .await;

        let pool = setup_test_db();
        let places = PlacesClient::new("key".to_string(), server.base_url(), Duration::ZERO);

        let report = seed_restaurants_for_city(&pool, &places, "Montreal", 50).await.unwrap();

        assert_eq!(report, SeedReport { inserted: 2, failed: 0 });
        let stored = repo::list_restaurants(&pool).unwrap();
        assert_eq!(stored[0].restaurant.get_name(), "Trattoria");
        assert_eq!(stored[0].restaurant.get_cuisine(), &["Italian".to_string()]);
        assert_eq!(stored[1].restaurant.get_cuisine(), &["Restaurant".to_string()]);
        assert!(stored.iter().all(|r| r.aggregate.is_none()));
    }

    #[tokio::test]
    async fn test_seed_fails_when_city_is_unknown() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/geocode/json");
                then.status(200).json_body(json!({ "status": "ZERO_RESULTS", "results": [] }));
            })
            .await;

        let pool = setup_test_db();
        let places = PlacesClient::new("key".to_string(), server.base_url(), Duration::ZERO);

        let result = seed_restaurants_for_city(&pool, &places, "Atlantis", 50).await;

        assert!(matches!(result, Err(PlacesError::Geocode(_))));
        assert!(repo::list_restaurants(&pool).unwrap().is_empty());
    }
}
