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

use super::UserSummary;

/// Lowest score a rating dimension accepts
pub const MIN_SCORE: i32 = 1;

/// Highest score a rating dimension accepts
pub const MAX_SCORE: i32 = 10;

/// The meal a rating was given for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum Mealtype {
    Breakfast,
    Brunch,
    Lunch,
    Dinner,
}

impl Mealtype {
    pub const ALL: [Mealtype; 4] = [Mealtype::Breakfast, Mealtype::Brunch, Mealtype::Lunch, Mealtype::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mealtype::Breakfast => "Breakfast",
            Mealtype::Brunch => "Brunch",
            Mealtype::Lunch => "Lunch",
            Mealtype::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for Mealtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mealtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mealtype::ALL
            .into_iter()
            .find(|meal| meal.as_str() == s)
            .ok_or_else(|| format!("Unknown meal: {}", s))
    }
}

impl FromSql<Text, Sqlite> for Mealtype {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse()?)
    }
}

impl ToSql<Text, Sqlite> for Mealtype {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

/// The three scores of a single rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingScores {
    pub service: i32,
    pub foodquality: i32,
    pub ambiance: i32,
}

impl RatingScores {
    pub fn new(service: i32, foodquality: i32, ambiance: i32) -> Self {
        Self { service, foodquality, ambiance }
    }

    /// True when every score lies in `MIN_SCORE..=MAX_SCORE`
    pub fn is_valid(&self) -> bool {
        [self.service, self.foodquality, self.ambiance]
            .iter()
            .all(|score| (MIN_SCORE..=MAX_SCORE).contains(score))
    }
}

/// One user's rating of one restaurant
///
/// This struct maps directly to the `ratings` table in the database.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::ratings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Rating {
    id: i32,
    #[serde(rename = "restaurantId")]
    restaurant_id: i32,
    #[serde(rename = "userId")]
    user_id: String,
    rating_service: i32,
    rating_foodquality: i32,
    rating_ambiance: i32,
    meal: Mealtype,
    #[serde(rename = "visitDate")]
    visit_date: NaiveDateTime,
    notes: Option<String>,
    #[serde(rename = "createdAt")]
    created_at: NaiveDateTime,
    #[serde(rename = "updatedAt")]
    updated_at: NaiveDateTime,
}

impl Rating {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_restaurant_id(&self) -> i32 {
        self.restaurant_id
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_scores(&self) -> RatingScores {
        RatingScores::new(self.rating_service, self.rating_foodquality, self.rating_ambiance)
    }

    pub fn get_meal(&self) -> Mealtype {
        self.meal
    }

    pub fn get_notes(&self) -> Option<String> {
        self.notes.clone()
    }

    pub fn get_visit_date(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.visit_date, Utc)
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

/// Everything needed to record a rating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingInput {
    pub user_id: String,
    pub scores: RatingScores,
    pub meal: Mealtype,
    pub notes: Option<String>,
    pub visit_date: Option<NaiveDateTime>,
}

/// Insertable form of a rating; the database assigns the ID
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::ratings)]
pub struct NewRating {
    pub restaurant_id: i32,
    pub user_id: String,
    pub rating_service: i32,
    pub rating_foodquality: i32,
    pub rating_ambiance: i32,
    pub meal: Mealtype,
    pub visit_date: NaiveDateTime,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewRating {
    /// Builds the row for `input` against `restaurant_id`, stamped now
    pub fn new(restaurant_id: i32, input: RatingInput) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            restaurant_id,
            user_id: input.user_id,
            rating_service: input.scores.service,
            rating_foodquality: input.scores.foodquality,
            rating_ambiance: input.scores.ambiance,
            meal: input.meal,
            visit_date: input.visit_date.unwrap_or(now),
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A rating with the rating user's public details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingWithUser {
    #[serde(flatten)]
    pub rating: Rating,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mealtype_round_trips_through_str() {
        for meal in Mealtype::ALL {
            assert_eq!(meal.as_str().parse::<Mealtype>().unwrap(), meal);
        }
        assert!("Supper".parse::<Mealtype>().is_err());
        assert!("dinner".parse::<Mealtype>().is_err());
    }

    #[test]
    fn test_scores_validity_bounds() {
        assert!(RatingScores::new(1, 10, 5).is_valid());
        assert!(!RatingScores::new(0, 5, 5).is_valid());
        assert!(!RatingScores::new(5, 11, 5).is_valid());
        assert!(!RatingScores::new(5, 5, -3).is_valid());
    }

    #[test]
    fn test_new_rating_defaults_visit_date_to_now() {
        let input = RatingInput {
            user_id: "user-1".to_string(),
            scores: RatingScores::new(7, 8, 9),
            meal: Mealtype::Lunch,
            notes: Some("Great soup".to_string()),
            visit_date: None,
        };

        let row = NewRating::new(3, input);

        assert_eq!(row.restaurant_id, 3);
        assert_eq!(row.rating_service, 7);
        assert_eq!(row.rating_foodquality, 8);
        assert_eq!(row.rating_ambiance, 9);
        assert_eq!(row.visit_date, row.created_at);
    }
}
