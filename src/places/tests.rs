use super::*;
use httpmock::prelude::*;
use serde_json::json;

fn client_for(server: &MockServer) -> PlacesClient {
    PlacesClient::new("test-key".to_string(), server.base_url(), Duration::ZERO)
}

fn place_json(name: &str, types: &[&str]) -> serde_json::Value {
    json!({
        "name": name,
        "vicinity": format!("{} street", name),
        "geometry": { "location": { "lat": 45.5, "lng": -73.6 } },
        "types": types,
    })
}

#[test]
fn test_extract_cuisine() {
    let types = |t: &[&str]| t.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    assert_eq!(extract_cuisine(&types(&["thai_restaurant", "food"])), vec!["Thai"]);
    assert_eq!(
        extract_cuisine(&types(&["italian_restaurant", "pizza", "italian_cafe", "greek_restaurant"])),
        vec!["Italian", "Greek"]
    );
    assert_eq!(extract_cuisine(&types(&["restaurant", "point_of_interest"])), vec!["Restaurant"]);
    assert_eq!(extract_cuisine(&[]), vec!["Restaurant"]);
}

#[test]
fn test_place_to_restaurant() {
    let mut place: Place = serde_json::from_value(place_json("Pho Lan", &["vietnamese_restaurant"])).unwrap();
    place.formatted_phone_number = Some("514-555-0100".to_string());

    let restaurant = place_to_restaurant(place);

    assert_eq!(restaurant.name, "Pho Lan");
    assert_eq!(restaurant.address, "Pho Lan street");
    assert_eq!(restaurant.latitude, 45.5);
    assert_eq!(restaurant.longitude, -73.6);
    assert_eq!(restaurant.cuisine.0, vec!["Restaurant"]);
    assert_eq!(restaurant.phone.as_deref(), Some("514-555-0100"));
    assert!(restaurant.website.is_none());
    assert!(restaurant.is_active);
}

#[tokio::test]
async fn test_geocode_success() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/geocode/json")
                .query_param("address", "Montreal")
                .query_param("key", "test-key");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [{ "geometry": { "location": { "lat": 45.5017, "lng": -73.5673 } } }]
            }));
        })
        .await;

    let location = client_for(&server).geocode("Montreal").await.unwrap();

    assert_eq!(location, LatLng { lat: 45.5017, lng: -73.5673 });
    mock.assert_async().await;
}

#[tokio::test]
async fn test_geocode_unknown_city() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/geocode/json");
            then.status(200).json_body(json!({ "status": "ZERO_RESULTS", "results": [] }));
        })
        .await;

    let err = client_for(&server).geocode("Atlantis").await.unwrap_err();

    assert!(matches!(err, PlacesError::Geocode(ref city) if city == "Atlantis"));
    assert_eq!(err.to_string(), "Could not geocode city: Atlantis");
}

#[tokio::test]
async fn test_geocode_http_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/geocode/json");
            then.status(500).body("boom");
        })
        .await;

    let err = client_for(&server).geocode("Montreal").await.unwrap_err();

    assert!(matches!(err, PlacesError::Request(_)));
}

#[tokio::test]
async fn test_nearby_restaurants_follows_pages() {
    let server = MockServer::start_async().await;
    let first_page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/place/nearbysearch/json")
                .query_param("location", "45.5,-73.6")
                .query_param("radius", "5000")
                .query_param("type", "restaurant")
                .query_param_missing("pagetoken");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [place_json("A", &["thai_restaurant"]), place_json("B", &[])],
                "next_page_token": "page-2"
            }));
        })
        .await;
    let second_page = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/place/nearbysearch/json")
                .query_param("pagetoken", "page-2");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [place_json("C", &["korean_restaurant"])]
            }));
        })
        .await;

    let places = client_for(&server)
        .nearby_restaurants(LatLng { lat: 45.5, lng: -73.6 }, 10)
        .await
        .unwrap();

    let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
    first_page.assert_async().await;
    second_page.assert_async().await;
}

#[tokio::test]
async fn test_nearby_restaurants_stops_at_limit() {
    let server = MockServer::start_async().await;
    let first_page = server
        .mock_async(|when, then| {
            when.method(GET).path("/place/nearbysearch/json");
            then.status(200).json_body(json!({
                "status": "OK",
                "results": [place_json("A", &[]), place_json("B", &[]), place_json("C", &[])],
                "next_page_token": "page-2"
            }));
        })
        .await;

    let places = client_for(&server)
        .nearby_restaurants(LatLng { lat: 45.5, lng: -73.6 }, 2)
        .await
        .unwrap();

    assert_eq!(places.len(), 2);
    first_page.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_nearby_restaurants_zero_results_is_empty() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/place/nearbysearch/json");
            then.status(200).json_body(json!({ "status": "ZERO_RESULTS", "results": [] }));
        })
        .await;

    let places = client_for(&server)
        .nearby_restaurants(LatLng { lat: 0.0, lng: 0.0 }, 10)
        .await
        .unwrap();

    assert!(places.is_empty());
}

#[tokio::test]
async fn test_nearby_restaurants_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/place/nearbysearch/json");
            then.status(200).json_body(json!({ "status": "REQUEST_DENIED", "results": [] }));
        })
        .await;

    let err = client_for(&server)
        .nearby_restaurants(LatLng { lat: 0.0, lng: 0.0 }, 10)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Places API error: REQUEST_DENIED");
}
