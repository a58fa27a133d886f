use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::RatingScores;

/// Denormalized per-restaurant rating summary
///
/// This struct maps directly to the `restaurant_aggregates` table. The row is
/// recomputed from every rating of the restaurant each time a rating is
/// written, so it never drifts from the underlying ratings.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::restaurant_aggregates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RestaurantAggregate {
    #[serde(rename = "restaurantId")]
    restaurant_id: i32,
    #[serde(rename = "totalRatings")]
    total_ratings: i32,
    avg_service: f64,
    avg_foodquality: f64,
    avg_ambiance: f64,
    avg_overall: f64,
    #[serde(rename = "updatedAt")]
    updated_at: NaiveDateTime,
}

impl RestaurantAggregate {
    /// Builds the aggregate row of `restaurant_id` from computed stats
    pub fn new(restaurant_id: i32, stats: AggregateStats) -> Self {
        Self {
            restaurant_id,
            total_ratings: stats.total_ratings,
            avg_service: stats.avg_service,
            avg_foodquality: stats.avg_foodquality,
            avg_ambiance: stats.avg_ambiance,
            avg_overall: stats.avg_overall,
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_restaurant_id(&self) -> i32 {
        self.restaurant_id
    }

    pub fn get_total_ratings(&self) -> i32 {
        self.total_ratings
    }

    pub fn get_avg_service(&self) -> f64 {
        self.avg_service
    }

    pub fn get_avg_foodquality(&self) -> f64 {
        self.avg_foodquality
    }

    pub fn get_avg_ambiance(&self) -> f64 {
        self.avg_ambiance
    }

    pub fn get_avg_overall(&self) -> f64 {
        self.avg_overall
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }

    /// Overall average on a 0-5 star scale
    pub fn display_rating(&self) -> f64 {
        self.avg_overall / 2.0
    }
}

/// The numbers stored in an aggregate row
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AggregateStats {
    pub total_ratings: i32,
    pub avg_service: f64,
    pub avg_foodquality: f64,
    pub avg_ambiance: f64,
    pub avg_overall: f64,
}

impl AggregateStats {
    /// Reduces a restaurant's ratings to its aggregate
    ///
    /// Each average is rounded to two decimals. The overall average is the
    /// mean of all three dimensions over all ratings. No ratings yields zeros.
    pub fn from_scores(scores: &[RatingScores]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let count = scores.len() as f64;
        let (service, food, ambiance) = scores.iter().fold((0i64, 0i64, 0i64), |(s, f, a), r| {
            (s + r.service as i64, f + r.foodquality as i64, a + r.ambiance as i64)
        });

        Self {
            total_ratings: scores.len() as i32,
            avg_service: round2(service as f64 / count),
            avg_foodquality: round2(food as f64 / count),
            avg_ambiance: round2(ambiance as f64 / count),
            avg_overall: round2((service + food + ambiance) as f64 / (count * 3.0)),
        }
    }
}

/// Rounds to two decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ratings_gives_zeroes() {
        assert_eq!(AggregateStats::from_scores(&[]), AggregateStats::default());
    }

    #[test]
    fn test_single_rating_is_its_own_average() {
        let stats = AggregateStats::from_scores(&[RatingScores::new(8, 6, 7)]);

        assert_eq!(stats.total_ratings, 1);
        assert_eq!(stats.avg_service, 8.0);
        assert_eq!(stats.avg_foodquality, 6.0);
        assert_eq!(stats.avg_ambiance, 7.0);
        assert_eq!(stats.avg_overall, 7.0);
    }

    #[test]
    fn test_averages_round_to_two_decimals() {
        let stats = AggregateStats::from_scores(&[
            RatingScores::new(10, 9, 1),
            RatingScores::new(9, 9, 2),
            RatingScores::new(9, 8, 2),
        ]);

        assert_eq!(stats.total_ratings, 3);
        assert_eq!(stats.avg_service, 9.33);
        assert_eq!(stats.avg_foodquality, 8.67);
        assert_eq!(stats.avg_ambiance, 1.67);
        assert_eq!(stats.avg_overall, 6.56);
    }

    #[test]
    fn test_display_rating_halves_overall() {
        let aggregate = RestaurantAggregate::new(1, AggregateStats::from_scores(&[RatingScores::new(9, 9, 9)]));
        assert_eq!(aggregate.display_rating(), 4.5);
    }
}
