use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::ApiError;
use crate::models::{
    Cuisine, JsonList, Mealtype, NewRestaurant, PriceRange, RatingInput, RatingScores, RestaurantWithAggregate,
    UserChanges, MAX_SCORE, MIN_SCORE,
};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Default number of entries returned by the rankings
pub const DEFAULT_RANKINGS_LIMIT: i64 = 10;

/// Largest number of entries the rankings return in one response
pub const MAX_RANKINGS_LIMIT: i64 = 100;

/// Default search radius of the surprise recommendation, in kilometres
pub const DEFAULT_SURPRISE_DISTANCE_KM: f64 = 20.0;

/// Default number of places fetched when seeding a city
pub const DEFAULT_SEED_LIMIT: usize = 50;

/// Data transfer object for registering a new user
#[derive(Deserialize, Debug)]
pub struct RegisterDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

impl RegisterDto {
    /// Checks the email shape and password length
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

/// Data transfer object for logging in
#[derive(Deserialize, Debug)]
pub struct LoginDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Data transfer object for updating the caller's profile
///
/// Absent fields are left unchanged.
#[derive(Deserialize, Debug, Default)]
pub struct UpdateUserDto {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateUserDto {
    /// Validates the given fields and builds the changeset
    ///
    /// `hash` turns a new plain-text password into its stored hash; it is
    /// only called when a password was supplied.
    pub fn into_changes<F>(self, hash: F) -> Result<UserChanges, ApiError>
    where
        F: FnOnce(&str) -> Result<String, ApiError>,
    {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }

        let password_hash = match self.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash(password)?)
            }
            None => None,
        };

        Ok(UserChanges {
            email: self.email.map(|e| e.trim().to_string()),
            password_hash,
            display_name: self.display_name,
            updated_at: None,
        })
    }
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::BadRequest("A valid email is required".to_string())),
    }
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Returns the score as an integer in `MIN_SCORE..=MAX_SCORE`, if it is one
fn score_value(value: Option<&Value>) -> Option<i32> {
    let n = value?.as_f64()?;
    let in_range = n >= MIN_SCORE as f64 && n <= MAX_SCORE as f64;
    (in_range && n.fract() == 0.0).then_some(n as i32)
}

/// Parses the meal name; unknown names and non-strings count as missing
fn meal_value(meal: Option<&Value>) -> Option<Mealtype> {
    meal?.as_str()?.parse().ok()
}

/// Reads a number sent either as a JSON number or as a numeric string
fn number_value(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

/// Reads a non-blank string; any other JSON type counts as absent
fn text_value(value: Option<&Value>) -> Option<String> {
    value?.as_str().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Reads a list of strings, trimmed and without blank entries
///
/// `None` unless the value is an array of strings with at least one
/// non-blank entry.
fn text_list(value: Option<&Value>) -> Option<Vec<String>> {
    let entries = value?
        .as_array()?
        .iter()
        .map(|entry| entry.as_str().map(str::trim))
        .collect::<Option<Vec<_>>>()?;

    let list: Vec<String> = entries.into_iter().filter(|e| !e.is_empty()).map(str::to_string).collect();
    (!list.is_empty()).then_some(list)
}

/// Keeps an explicit `null` as `Some(Value::Null)`, so that only an absent
/// field deserializes to `None`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Data transfer object for creating a restaurant together with its first rating
///
/// Every field is optional at the serde level, and the required ones are
/// kept as raw JSON, so that missing or mistyped fields produce the same 400
/// response as invalid ones.
#[derive(Deserialize, Debug, Default)]
pub struct CreateRestaurantDto {
    #[serde(default, rename = "userId")]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
    #[serde(default)]
    pub cuisine: Option<Value>,
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub meal: Option<Value>,
    #[serde(default)]
    pub rating_service: Option<Value>,
    #[serde(default)]
    pub rating_foodquality: Option<Value>,
    #[serde(default)]
    pub rating_ambiance: Option<Value>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, rename = "visitDate")]
    pub visit_date: Option<NaiveDateTime>,
    #[serde(default, rename = "priceRange")]
    pub price_range: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub photos: Option<Vec<String>>,
}

impl CreateRestaurantDto {
    /// Validates the request and splits it into the restaurant row and the
    /// creator's rating
    ///
    /// ### Errors
    ///
    /// - `Missing required fields` if any required field is absent, blank or
    ///   of the wrong type, the cuisine list has no non-blank entry, or the
    ///   meal is not a known meal
    /// - `<field> must be a number between 1 and 10` for the first bad score
    /// - an invalid coordinate or price range
    pub fn into_parts(self) -> Result<(NewRestaurant, RatingInput), ApiError> {
        let missing = || ApiError::BadRequest("Missing required fields".to_string());

        let user_id = text_value(self.user_id.as_ref()).ok_or_else(missing)?;
        let name = text_value(self.name.as_ref()).ok_or_else(missing)?;
        let address = text_value(self.address.as_ref()).ok_or_else(missing)?;
        let cuisine: Vec<Cuisine> = text_list(self.cuisine.as_ref()).ok_or_else(missing)?;
        let latitude = self.latitude.ok_or_else(missing)?;
        let longitude = self.longitude.ok_or_else(missing)?;
        let meal = meal_value(self.meal.as_ref()).ok_or_else(missing)?;

        let mut scores = [0; 3];
        let fields = [
            ("rating_service", &self.rating_service),
            ("rating_foodquality", &self.rating_foodquality),
            ("rating_ambiance", &self.rating_ambiance),
        ];
        for (slot, (key, value)) in scores.iter_mut().zip(fields) {
            *slot = score_value(value.as_ref()).ok_or_else(|| {
                ApiError::InvalidRating(format!("{} must be a number between {} and {}", key, MIN_SCORE, MAX_SCORE))
            })?;
        }

        let invalid_coordinates =
            || ApiError::BadRequest("Latitude and longitude must be valid coordinates".to_string());
        let latitude = number_value(Some(&latitude))
            .filter(|lat| (-90.0..=90.0).contains(lat))
            .ok_or_else(invalid_coordinates)?;
        let longitude = number_value(Some(&longitude))
            .filter(|lng| (-180.0..=180.0).contains(lng))
            .ok_or_else(invalid_coordinates)?;

        let price_range = match non_blank(self.price_range.as_ref()) {
            Some(price) => Some(
                price
                    .parse::<PriceRange>()
                    .map_err(|_| ApiError::BadRequest("priceRange must be one of $, $$, $$$, $$$$".to_string()))?,
            ),
            None => None,
        };

        let mut restaurant = NewRestaurant::new(name, address, cuisine, latitude, longitude);
        restaurant.price_range = price_range;
        restaurant.phone = non_blank(self.phone.as_ref());
        restaurant.website = non_blank(self.website.as_ref());
        restaurant.photos = JsonList(self.photos.unwrap_or_default());

        let rating = RatingInput {
            user_id,
            scores: RatingScores::new(scores[0], scores[1], scores[2]),
            meal,
            notes: non_blank(self.notes.as_ref()),
            visit_date: self.visit_date,
        };

        Ok((restaurant, rating))
    }
}

/// Data transfer object for rating an existing restaurant
///
/// A score sent as `null` counts as present, so it is reported as out of
/// range rather than missing.
#[derive(Deserialize, Debug, Default)]
pub struct CreateRatingDto {
    #[serde(default, rename = "restaurantId")]
    pub restaurant_id: Option<Value>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub rating_service: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub rating_foodquality: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub rating_ambiance: Option<Value>,
    #[serde(default)]
    pub meal: Option<Value>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, rename = "visitDate")]
    pub visit_date: Option<NaiveDateTime>,
}

impl CreateRatingDto {
    /// Validates the request and returns the restaurant ID with the rating
    ///
    /// ### Errors
    ///
    /// - `Missing required fields` if the restaurant, user, any score or the
    ///   meal is absent, or the meal is not a known meal
    /// - `Invalid restaurant ID` if the restaurant ID is not a positive integer
    /// - `Ratings must be numbers between 1 and 10` if any score is out of range
    pub fn into_parts(self) -> Result<(i32, RatingInput), ApiError> {
        let missing = || ApiError::BadRequest("Missing required fields".to_string());

        let restaurant_id = self.restaurant_id.ok_or_else(missing)?;
        let user_id = text_value(self.user_id.as_ref()).ok_or_else(missing)?;
        if self.rating_service.is_none() || self.rating_foodquality.is_none() || self.rating_ambiance.is_none() {
            return Err(missing());
        }
        let meal = meal_value(self.meal.as_ref()).ok_or_else(missing)?;

        let restaurant_id = number_value(Some(&restaurant_id))
            .filter(|id| id.fract() == 0.0 && *id >= 1.0 && *id <= i32::MAX as f64)
            .map(|id| id as i32)
            .ok_or_else(|| ApiError::BadRequest("Invalid restaurant ID".to_string()))?;

        let out_of_range = || {
            ApiError::InvalidRating(format!("Ratings must be numbers between {} and {}", MIN_SCORE, MAX_SCORE))
        };
        let service = score_value(self.rating_service.as_ref()).ok_or_else(out_of_range)?;
        let foodquality = score_value(self.rating_foodquality.as_ref()).ok_or_else(out_of_range)?;
        let ambiance = score_value(self.rating_ambiance.as_ref()).ok_or_else(out_of_range)?;

        Ok((
            restaurant_id,
            RatingInput {
                user_id,
                scores: RatingScores::new(service, foodquality, ambiance),
                meal,
                notes: non_blank(self.notes.as_ref()),
                visit_date: self.visit_date,
            },
        ))
    }
}

/// Query parameters of `GET /api/restaurants`
#[derive(Deserialize, Debug, Default)]
pub struct RestaurantsQuery {
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

/// Query parameters of `GET /api/rating`
#[derive(Deserialize, Debug, Default)]
pub struct RatingsQuery {
    #[serde(default, rename = "restaurantId")]
    pub restaurant_id: Option<String>,
}

impl RatingsQuery {
    /// Parses the restaurant ID; missing, zero or non-numeric IDs are rejected
    pub fn restaurant_id(&self) -> Result<i32, ApiError> {
        self.restaurant_id
            .as_deref()
            .and_then(|id| id.trim().parse::<i32>().ok())
            .filter(|id| *id != 0)
            .ok_or_else(|| ApiError::BadRequest("Restaurant ID is required".to_string()))
    }
}

/// Query parameters of `GET /api/rankings`
#[derive(Deserialize, Debug, Default)]
pub struct RankingsQuery {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default, rename = "minRatings")]
    pub min_ratings: Option<i32>,
}

impl RankingsQuery {
    /// The requested page size, clamped to `1..=MAX_RANKINGS_LIMIT`
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_RANKINGS_LIMIT).clamp(1, MAX_RANKINGS_LIMIT)
    }

    /// The minimum number of ratings, at least 1
    pub fn min_ratings(&self) -> i32 {
        self.min_ratings.unwrap_or(1).max(1)
    }
}

/// Query parameters of `GET /api/surprise`
#[derive(Deserialize, Debug, Default)]
pub struct SurpriseQuery {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, rename = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub cuisine: Option<String>,
}

impl SurpriseQuery {
    /// Returns the validated origin as `(latitude, longitude)`
    pub fn origin(&self) -> Result<(f64, f64), ApiError> {
        let invalid = || ApiError::BadRequest("Latitude and longitude must be valid coordinates".to_string());
        let latitude = self.latitude.filter(|lat| (-90.0..=90.0).contains(lat)).ok_or_else(invalid)?;
        let longitude = self.longitude.filter(|lng| (-180.0..=180.0).contains(lng)).ok_or_else(invalid)?;
        Ok((latitude, longitude))
    }

    /// The search radius; must be positive
    pub fn distance_km(&self) -> Result<f64, ApiError> {
        match self.distance_km {
            None => Ok(DEFAULT_SURPRISE_DISTANCE_KM),
            Some(d) if d.is_finite() && d > 0.0 => Ok(d),
            Some(_) => Err(ApiError::BadRequest("distanceKm must be a positive number".to_string())),
        }
    }

    /// The cuisine filter; blank and `any` mean no filter
    pub fn cuisine(&self) -> Option<&str> {
        self.cuisine
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("any"))
    }
}

/// Data transfer object for seeding restaurants of a city
#[derive(Deserialize, Debug, Default)]
pub struct SeedDto {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SeedDto {
    /// Returns the city name and the number of places to fetch
    pub fn into_parts(self) -> Result<(String, usize), ApiError> {
        let city = non_blank(self.city.as_ref())
            .ok_or_else(|| ApiError::BadRequest("City is required".to_string()))?;
        let limit = self.limit.unwrap_or(DEFAULT_SEED_LIMIT);
        if limit == 0 {
            return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
        }
        Ok((city, limit))
    }
}

/// One entry of the rankings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RankedRestaurantDto {
    pub rank: usize,
    #[serde(rename = "displayRating")]
    pub display_rating: f64,
    #[serde(flatten)]
    pub restaurant: RestaurantWithAggregate,
}

/// The recommended restaurant and how far away it is
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecommendationDto {
    pub restaurant: RestaurantWithAggregate,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Response of the surprise recommendation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SurpriseDto {
    #[serde(rename = "matchCount")]
    pub match_count: usize,
    pub recommendation: Option<RecommendationDto>,
}

/// Dashboard numbers shown on the home page
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DashboardSummaryDto {
    #[serde(rename = "totalRestaurants")]
    pub total_restaurants: usize,
    #[serde(rename = "highestRated")]
    pub highest_rated: Option<RestaurantWithAggregate>,
    #[serde(rename = "topRestaurants")]
    pub top_restaurants: Vec<RestaurantWithAggregate>,
    #[serde(rename = "recentlyAdded")]
    pub recently_added: Vec<RestaurantWithAggregate>,
    #[serde(rename = "overallAverageRating")]
    pub overall_average_rating: f64,
}

/// Outcome of a seeding run
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeedResultDto {
    pub success: bool,
    pub message: String,
    pub inserted: usize,
    pub failed: usize,
}
