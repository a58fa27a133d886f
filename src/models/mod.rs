/// Data models module
///
/// This module defines the core data structures used throughout the application.
/// It includes database models that map to database tables, insertable forms
/// for new rows, and the composite shapes returned by the API.

mod json_list;
pub use json_list::JsonList;

mod user;
pub use user::{User, UserChanges, UserSummary};

mod restaurant;
pub use restaurant::{
    Cuisine, NewRestaurant, PriceRange, RatedRestaurant, Restaurant, RestaurantWithAggregate,
    RestaurantWithUserRating,
};

mod rating;
pub use rating::{Mealtype, NewRating, Rating, RatingInput, RatingScores, RatingWithUser, MAX_SCORE, MIN_SCORE};

mod restaurant_aggregate;
pub use restaurant_aggregate::{round2, AggregateStats, RestaurantAggregate};

use serde::{Deserialize, Serialize};

/// A restaurant page: the restaurant with its aggregate and every rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantDetail {
    pub restaurant: RestaurantWithAggregate,
    pub ratings: Vec<RatingWithUser>,
}
