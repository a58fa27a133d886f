use clap::ValueEnum;
use serde::Serialize;
use tablerank::dto::{RankedRestaurantDto, SeedResultDto};
use tablerank::models::{RatedRestaurant, Rating, RatingWithUser, Restaurant, RestaurantDetail, RestaurantWithAggregate};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn stars(display_rating: f64) -> String {
    format!("{:.2}", display_rating)
}

fn cuisine_list(restaurant: &Restaurant) -> String {
    restaurant.get_cuisine().join(", ")
}

/// Prints one table row per restaurant
fn print_restaurant_rows<'a>(rows: impl Iterator<Item = (&'a Restaurant, f64, i32)>) {
    println!("{:>5}  {:<30}  {:<20}  {:>5}  {:>7}", "ID", "NAME", "CUISINE", "STARS", "RATINGS");
    for (restaurant, display_rating, total) in rows {
        println!(
            "{:>5}  {:<30}  {:<20}  {:>5}  {:>7}",
            restaurant.get_id(),
            restaurant.get_name(),
            cuisine_list(restaurant),
            stars(display_rating),
            total,
        );
    }
}

/// Prints a list of restaurants in the specified format
pub fn print_restaurants(restaurants: &[RestaurantWithAggregate], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if restaurants.is_empty() {
                if !config.quiet {
                    println!("No restaurants found.");
                }
                return;
            }
            if config.quiet {
                for r in restaurants {
                    println!("{}", r.restaurant.get_id());
                }
                return;
            }
            print_restaurant_rows(
                restaurants
                    .iter()
                    .map(|r| (&r.restaurant, r.display_rating(), r.total_ratings())),
            );
        }
        OutputFormat::Json => print_json(restaurants),
    }
}

/// Prints the restaurants a user rated in the specified format
pub fn print_rated_restaurants(restaurants: &[RatedRestaurant], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if restaurants.is_empty() {
                if !config.quiet {
                    println!("This user has not rated any restaurant.");
                }
                return;
            }
            if config.quiet {
                for r in restaurants {
                    println!("{}", r.restaurant.get_id());
                }
                return;
            }
            print_restaurant_rows(restaurants.iter().map(|r| {
                let display = r.aggregate.as_ref().map_or(0.0, |a| a.display_rating());
                let total = r.aggregate.as_ref().map_or(0, |a| a.get_total_ratings());
                (&r.restaurant, display, total)
            }));
        }
        OutputFormat::Json => print_json(restaurants),
    }
}

/// Prints a restaurant with its ratings in the specified format
pub fn print_restaurant_detail(detail: &RestaurantDetail, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            let restaurant = &detail.restaurant.restaurant;
            if config.quiet {
                println!("{}", restaurant.get_id());
                return;
            }
            println!("ID:       {}", restaurant.get_id());
            println!("Name:     {}", restaurant.get_name());
            println!("Address:  {}", restaurant.get_address());
            println!("Cuisine:  {}", cuisine_list(restaurant));
            println!("Location: {}, {}", restaurant.get_latitude(), restaurant.get_longitude());
            if let Some(price) = restaurant.get_price_range() {
                println!("Price:    {}", price);
            }
            if let Some(phone) = restaurant.get_phone() {
                println!("Phone:    {}", phone);
            }
            if let Some(website) = restaurant.get_website() {
                println!("Website:  {}", website);
            }
            match &detail.restaurant.aggregate {
                Some(aggregate) => {
                    println!(
                        "Rating:   {} stars from {} ratings (service {:.2}, food {:.2}, ambiance {:.2})",
                        stars(aggregate.display_rating()),
                        aggregate.get_total_ratings(),
                        aggregate.get_avg_service(),
                        aggregate.get_avg_foodquality(),
                        aggregate.get_avg_ambiance(),
                    );
                }
                None => println!("Rating:   not rated yet"),
            }
            if !detail.ratings.is_empty() {
                println!();
                print_rating_rows(&detail.ratings);
            }
        }
        OutputFormat::Json => print_json(detail),
    }
}

/// Prints the rankings in the specified format
pub fn print_rankings(ranked: &[RankedRestaurantDto], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if ranked.is_empty() {
                if !config.quiet {
                    println!("No rated restaurants yet.");
                }
                return;
            }
            if config.quiet {
                for entry in ranked {
                    println!("{}", entry.restaurant.restaurant.get_id());
                }
                return;
            }
            println!("{:>4}  {:<30}  {:>5}  {:>7}", "RANK", "NAME", "STARS", "RATINGS");
            for entry in ranked {
                println!(
                    "{:>4}  {:<30}  {:>5}  {:>7}",
                    entry.rank,
                    entry.restaurant.restaurant.get_name(),
                    stars(entry.display_rating),
                    entry.restaurant.total_ratings(),
                );
            }
        }
        OutputFormat::Json => print_json(ranked),
    }
}

fn print_rating_rows(ratings: &[RatingWithUser]) {
    println!("{:>5}  {:<25}  {:<9}  {:>4} {:>4} {:>4}  {}", "ID", "USER", "MEAL", "SERV", "FOOD", "AMB", "VISITED");
    for r in ratings {
        let scores = r.rating.get_scores();
        println!(
            "{:>5}  {:<25}  {:<9}  {:>4} {:>4} {:>4}  {}",
            r.rating.get_id(),
            r.user.email,
            r.rating.get_meal(),
            scores.service,
            scores.foodquality,
            scores.ambiance,
            r.rating.get_visit_date().format("%Y-%m-%d"),
        );
    }
}

/// Prints the ratings of a restaurant in the specified format
pub fn print_ratings(ratings: &[RatingWithUser], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if ratings.is_empty() {
                if !config.quiet {
                    println!("No ratings found.");
                }
                return;
            }
            if config.quiet {
                for r in ratings {
                    println!("{}", r.rating.get_id());
                }
                return;
            }
            print_rating_rows(ratings);
        }
        OutputFormat::Json => print_json(ratings),
    }
}

/// Prints a single rating in the specified format
pub fn print_rating(rating: &Rating, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", rating.get_id());
                return;
            }
            let scores = rating.get_scores();
            println!("ID:         {}", rating.get_id());
            println!("Restaurant: {}", rating.get_restaurant_id());
            println!("Meal:       {}", rating.get_meal());
            println!(
                "Scores:     service {}, food {}, ambiance {}",
                scores.service, scores.foodquality, scores.ambiance
            );
            if let Some(notes) = rating.get_notes() {
                println!("Notes:      {}", notes);
            }
            println!("Created:    {}", rating.get_created_at());
        }
        OutputFormat::Json => print_json(rating),
    }
}

/// Prints the outcome of a seeding run in the specified format
pub fn print_seed_result(result: &SeedResultDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", result.inserted);
                return;
            }
            println!("{}", result.message);
            println!("Inserted: {}", result.inserted);
            println!("Failed:   {}", result.failed);
        }
        OutputFormat::Json => print_json(result),
    }
}
