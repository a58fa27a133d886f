use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use tablerank::dto::{RankedRestaurantDto, SeedResultDto};
use tablerank::models::{
    Mealtype, RatedRestaurant, Rating, RatingScores, RatingWithUser, RestaurantDetail, RestaurantWithAggregate,
};

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Server { .. } => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// The fields of a new rating as sent by the CLI
#[derive(Debug, Clone)]
pub struct NewRatingRequest {
    pub restaurant_id: i32,
    pub user_id: String,
    pub scores: RatingScores,
    pub meal: Mealtype,
    pub notes: Option<String>,
}

/// HTTP client wrapper for communicating with the tablerank server
pub struct TablerankClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// The underlying HTTP client
    client: Client,
}

impl TablerankClient {
    /// Creates a new TablerankClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the tablerank server
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &serde_json::Value) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    // ── Restaurant endpoints ─────────────────────────────────────────

    /// Lists all active restaurants
    pub async fn list_restaurants(&self) -> Result<Vec<RestaurantWithAggregate>, ClientError> {
        self.get_json("/api/restaurants", &[]).await
    }

    /// Lists the restaurants a user has rated, with that user's ratings
    pub async fn list_rated_restaurants(&self, user_id: &str) -> Result<Vec<RatedRestaurant>, ClientError> {
        self.get_json("/api/restaurants", &[("userId", user_id.to_string())]).await
    }

    /// Gets a restaurant with all of its ratings
    pub async fn get_restaurant(&self, id: i32) -> Result<RestaurantDetail, ClientError> {
        self.get_json(&format!("/api/restaurants/{}", id), &[]).await
    }

    /// Gets the rankings
    pub async fn rankings(&self, limit: Option<i64>, min_ratings: Option<i32>) -> Result<Vec<RankedRestaurantDto>, ClientError> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(min_ratings) = min_ratings {
            query.push(("minRatings", min_ratings.to_string()));
        }
        self.get_json("/api/rankings", &query).await
    }

    // ── Rating endpoints ─────────────────────────────────────────────

    /// Lists the ratings of a restaurant, newest first
    pub async fn list_ratings(&self, restaurant_id: i32) -> Result<Vec<RatingWithUser>, ClientError> {
        self.get_json("/api/rating", &[("restaurantId", restaurant_id.to_string())]).await
    }

    /// Rates a restaurant
    pub async fn add_rating(&self, request: NewRatingRequest) -> Result<Rating, ClientError> {
        let body = json!({
            "restaurantId": request.restaurant_id,
            "userId": request.user_id,
            "rating_service": request.scores.service,
            "rating_foodquality": request.scores.foodquality,
            "rating_ambiance": request.scores.ambiance,
            "meal": request.meal,
            "notes": request.notes,
        });
        self.post_json("/api/rating", &body).await
    }

    // ── Admin endpoints ──────────────────────────────────────────────

    /// Seeds restaurants of a city from Google Places
    pub async fn seed(&self, city: String, limit: Option<usize>) -> Result<SeedResultDto, ClientError> {
        let body = json!({ "city": city, "limit": limit });
        self.post_json("/api/admin/seed-restaurants", &body).await
    }
}
