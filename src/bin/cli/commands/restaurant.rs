use clap::Subcommand;

use crate::client::TablerankClient;
use crate::output::{self, OutputConfig};

/// Restaurant commands
#[derive(Subcommand, Debug)]
pub enum RestaurantCommands {
    /// List active restaurants, or only those a user rated
    List {
        /// Only list restaurants rated by this user (UUID)
        #[clap(long)]
        user: Option<String>,
    },
    /// Show a restaurant with all of its ratings
    Show {
        /// The restaurant ID
        id: i32,
    },
    /// Show the best rated restaurants
    Rankings {
        /// Number of restaurants to show (1-100, default 10)
        #[clap(long)]
        limit: Option<i64>,
        /// Only rank restaurants with at least this many ratings
        #[clap(long)]
        min_ratings: Option<i32>,
    },
}

/// Executes a restaurant command
pub async fn execute(
    client: &TablerankClient,
    cmd: RestaurantCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RestaurantCommands::List { user: Some(user_id) } => {
            let restaurants = client.list_rated_restaurants(&user_id).await?;
            output::print_rated_restaurants(&restaurants, config);
        }
        RestaurantCommands::List { user: None } => {
            let restaurants = client.list_restaurants().await?;
            output::print_restaurants(&restaurants, config);
        }
        RestaurantCommands::Show { id } => {
            let detail = client.get_restaurant(id).await?;
            output::print_restaurant_detail(&detail, config);
        }
        RestaurantCommands::Rankings { limit, min_ratings } => {
            let ranked = client.rankings(limit, min_ratings).await?;
            output::print_rankings(&ranked, config);
        }
    }
    Ok(())
}
