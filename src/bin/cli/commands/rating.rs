use clap::Subcommand;
use tablerank::models::{Mealtype, RatingScores};

use crate::client::{NewRatingRequest, TablerankClient};
use crate::output::{self, OutputConfig};

/// Rating commands
#[derive(Subcommand, Debug)]
pub enum RatingCommands {
    /// List the ratings of a restaurant, newest first
    List {
        /// The restaurant ID
        restaurant_id: i32,
    },
    /// Rate a restaurant
    Add {
        /// The restaurant ID
        restaurant_id: i32,
        /// The rating user's UUID
        #[clap(long)]
        user: String,
        /// Service score (1-10)
        #[clap(long)]
        service: i32,
        /// Food quality score (1-10)
        #[clap(long)]
        food: i32,
        /// Ambiance score (1-10)
        #[clap(long)]
        ambiance: i32,
        /// Breakfast, Brunch, Lunch or Dinner
        #[clap(long)]
        meal: Mealtype,
        /// Free-form notes
        #[clap(long)]
        notes: Option<String>,
    },
}

/// Executes a rating command
pub async fn execute(
    client: &TablerankClient,
    cmd: RatingCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RatingCommands::List { restaurant_id } => {
            let ratings = client.list_ratings(restaurant_id).await?;
            output::print_ratings(&ratings, config);
        }
        RatingCommands::Add {
            restaurant_id,
            user,
            service,
            food,
            ambiance,
            meal,
            notes,
        } => {
            let rating = client
                .add_rating(NewRatingRequest {
                    restaurant_id,
                    user_id: user,
                    scores: RatingScores::new(service, food, ambiance),
                    meal,
                    notes,
                })
                .await?;
            output::print_rating(&rating, config);
        }
    }
    Ok(())
}
