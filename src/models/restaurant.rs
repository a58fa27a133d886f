use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};

use super::{JsonList, Rating, RestaurantAggregate};

/// A cuisine label such as "Italian" or "Thai"
pub type Cuisine = String;

/// Price bracket of a restaurant, from `$` to `$$$$`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum PriceRange {
    #[serde(rename = "$")]
    Budget,
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Expensive,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl PriceRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceRange::Budget => "$",
            PriceRange::Moderate => "$$",
            PriceRange::Expensive => "$$$",
            PriceRange::Luxury => "$$$$",
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "$" => Ok(PriceRange::Budget),
            "$$" => Ok(PriceRange::Moderate),
            "$$$" => Ok(PriceRange::Expensive),
            "$$$$" => Ok(PriceRange::Luxury),
            other => Err(format!("Unknown price range: {}", other)),
        }
    }
}

impl FromSql<Text, Sqlite> for PriceRange {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse()?)
    }
}

impl ToSql<Text, Sqlite> for PriceRange {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

/// Represents a restaurant
///
/// This struct maps directly to the `restaurants` table in the database.
/// Field order matches the table's column order so the struct can be loaded
/// from joined queries.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::restaurants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Restaurant {
    id: i32,
    name: String,
    address: String,
    cuisine: JsonList,
    latitude: f64,
    longitude: f64,
    #[serde(rename = "priceRange")]
    price_range: Option<PriceRange>,
    phone: Option<String>,
    website: Option<String>,
    photos: JsonList,
    #[serde(rename = "isActive")]
    is_active: bool,
    #[serde(rename = "createdAt")]
    created_at: NaiveDateTime,
    #[serde(rename = "updatedAt")]
    updated_at: NaiveDateTime,
}

impl Restaurant {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_address(&self) -> String {
        self.address.clone()
    }

    pub fn get_cuisine(&self) -> &[Cuisine] {
        &self.cuisine.0
    }

    /// Returns true if any of the restaurant's cuisines matches, ignoring case
    pub fn serves(&self, cuisine: &str) -> bool {
        self.cuisine.0.iter().any(|c| c.eq_ignore_ascii_case(cuisine))
    }

    pub fn get_latitude(&self) -> f64 {
        self.latitude
    }

    pub fn get_longitude(&self) -> f64 {
        self.longitude
    }

    pub fn get_price_range(&self) -> Option<PriceRange> {
        self.price_range
    }

    pub fn get_phone(&self) -> Option<String> {
        self.phone.clone()
    }

    pub fn get_website(&self) -> Option<String> {
        self.website.clone()
    }

    pub fn get_photos(&self) -> &[String] {
        &self.photos.0
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// Insertable form of a restaurant; the database assigns the ID
#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::restaurants)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
    pub cuisine: JsonList,
    pub latitude: f64,
    pub longitude: f64,
    pub price_range: Option<PriceRange>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub photos: JsonList,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewRestaurant {
    /// Creates an active restaurant with only the required fields set
    pub fn new(name: String, address: String, cuisine: Vec<Cuisine>, latitude: f64, longitude: f64) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            name,
            address,
            cuisine: JsonList(cuisine),
            latitude,
            longitude,
            price_range: None,
            phone: None,
            website: None,
            photos: JsonList::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A restaurant together with its aggregate row, if it has been rated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantWithAggregate {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub aggregate: Option<RestaurantAggregate>,
}

impl RestaurantWithAggregate {
    /// Star rating on a 0-5 scale; unrated restaurants score 0
    pub fn display_rating(&self) -> f64 {
        self.aggregate.as_ref().map_or(0.0, RestaurantAggregate::display_rating)
    }

    pub fn total_ratings(&self) -> i32 {
        self.aggregate.as_ref().map_or(0, RestaurantAggregate::get_total_ratings)
    }
}

impl From<(Restaurant, Option<RestaurantAggregate>)> for RestaurantWithAggregate {
    fn from((restaurant, aggregate): (Restaurant, Option<RestaurantAggregate>)) -> Self {
        Self { restaurant, aggregate }
    }
}

/// A restaurant a user has rated, with that user's ratings attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedRestaurant {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub aggregate: Option<RestaurantAggregate>,
    pub ratings: Vec<Rating>,
}

/// A newly created restaurant with the creator's first rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantWithUserRating {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    #[serde(rename = "userRating")]
    pub user_rating: Rating,
}
