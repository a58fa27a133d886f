//! Client for the Google Geocoding and Places Nearby Search web services.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::models::{Cuisine, NewRestaurant};

/// Search radius around the city centre, in metres
pub const SEARCH_RADIUS_M: u32 = 5000;

/// Cuisines recognised in a place's `types`
pub const KNOWN_CUISINES: [&str; 10] = [
    "italian", "chinese", "mexican", "indian", "japanese", "american", "thai", "french", "korean", "greek",
];

/// Cuisine given to places whose types name no known cuisine
pub const FALLBACK_CUISINE: &str = "Restaurant";

#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Places request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Could not geocode city: {0}")]
    Geocode(String),
    #[error("Places API error: {0}")]
    Status(String),
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize, Debug, Clone)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize, Debug)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize, Debug)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

/// A place as returned by a nearby search
#[derive(Deserialize, Debug, Clone)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    geometry: Geometry,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl Place {
    pub fn location(&self) -> LatLng {
        self.geometry.location
    }
}

#[derive(Deserialize, Debug)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<Place>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Maps place types to cuisine names
///
/// A type names a cuisine when it contains one of `KNOWN_CUISINES`, e.g.
/// `thai_restaurant`. Names are capitalized and listed once each, in the
/// order they first appear. Places without any gets `["Restaurant"]`.
pub fn extract_cuisine(types: &[String]) -> Vec<Cuisine> {
    let mut cuisines: Vec<Cuisine> = Vec::new();

    for place_type in types {
        let place_type = place_type.to_lowercase();
        if let Some(cuisine) = KNOWN_CUISINES.iter().find(|c| place_type.contains(*c)) {
            let mut name = cuisine[..1].to_uppercase();
            name.push_str(&cuisine[1..]);
            if !cuisines.contains(&name) {
                cuisines.push(name);
            }
        }
    }

    if cuisines.is_empty() {
        cuisines.push(FALLBACK_CUISINE.to_string());
    }
    cuisines
}

/// Converts a place into an active restaurant row
pub fn place_to_restaurant(place: Place) -> NewRestaurant {
    let location = place.location();
    let mut restaurant = NewRestaurant::new(
        place.name,
        place.vicinity.unwrap_or_default(),
        extract_cuisine(&place.types),
        location.lat,
        location.lng,
    );
    restaurant.phone = place.formatted_phone_number.filter(|p| !p.is_empty());
    restaurant.website = place.website.filter(|w| !w.is_empty());
    restaurant
}

/// HTTP client for the Google Maps web services
#[derive(Debug, Clone)]
pub struct PlacesClient {
    /// Base URL of the web services, without a trailing slash
    base_url: String,
    api_key: String,
    /// Pause before requesting the next page of results
    page_delay: Duration,
    client: Client,
}

impl PlacesClient {
    /// Creates a new PlacesClient
    ///
    /// ### Arguments
    ///
    /// * `api_key` - The Google Maps API key
    /// * `base_url` - e.g. `https://maps.googleapis.com/maps/api`
    /// * `page_delay` - Wait before fetching each follow-up page; Google only
    ///   honours a `next_page_token` after a short delay
    pub fn new(api_key: String, base_url: String, page_delay: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            page_delay,
            client: Client::new(),
        }
    }

    /// Resolves a city name to the coordinates of its first geocoding result
    #[instrument(skip(self))]
    pub async fn geocode(&self, city: &str) -> Result<LatLng, PlacesError> {
        let url = format!("{}/geocode/json", self.base_url);
        let response: GeocodeResponse = self
            .client
            .get(&url)
            .query(&[("address", city), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "OK" {
            warn!("Geocoding returned status {}", response.status);
            return Err(PlacesError::Geocode(city.to_string()));
        }

        let location = response
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location)
            .ok_or_else(|| PlacesError::Geocode(city.to_string()))?;

        debug!("Geocoded to {},{}", location.lat, location.lng);

        Ok(location)
    }

    /// Fetches up to `limit` restaurants around `location`, following result pages
    #[instrument(skip(self))]
    pub async fn nearby_restaurants(&self, location: LatLng, limit: usize) -> Result<Vec<Place>, PlacesError> {
        let url = format!("{}/place/nearbysearch/json", self.base_url);
        let location_param = format!("{},{}", location.lat, location.lng);
        let radius = SEARCH_RADIUS_M.to_string();

        let mut places: Vec<Place> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(&url).query(&[
                ("location", location_param.as_str()),
                ("radius", radius.as_str()),
                ("type", "restaurant"),
                ("key", self.api_key.as_str()),
            ]);
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pagetoken", token)]);
            }

            let page: NearbySearchResponse = request.send().await?.error_for_status()?.json().await?;

            match page.status.as_str() {
                "OK" | "ZERO_RESULTS" => {}
                other => return Err(PlacesError::Status(other.to_string())),
            }

            debug!("Fetched page of {} places", page.results.len());
            places.extend(page.results);

            page_token = page.next_page_token.filter(|token| !token.is_empty());
            if page_token.is_none() || places.len() >= limit {
                break;
            }

            tokio::time::sleep(self.page_delay).await;
        }

        places.truncate(limit);
        info!("Found {} places", places.len());

        Ok(places)
    }

    /// Geocodes `city` and returns up to `limit` of its restaurants as rows
    pub async fn fetch_city_restaurants(&self, city: &str, limit: usize) -> Result<Vec<NewRestaurant>, PlacesError> {
        let location = self.geocode(city).await?;
        let places = self.nearby_restaurants(location, limit).await?;
        Ok(places.into_iter().map(place_to_restaurant).collect())
    }
}

#[cfg(test)]
mod tests;
