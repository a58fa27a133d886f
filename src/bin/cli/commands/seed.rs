use clap::Args;

use crate::client::TablerankClient;
use crate::output::{self, OutputConfig};

/// Seed restaurants of a city from Google Places
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// The city to search, e.g. "Montreal"
    city: String,
    /// Maximum number of restaurants to add (default 50)
    #[clap(long)]
    limit: Option<usize>,
}

/// Executes the seed command
pub async fn execute(
    client: &TablerankClient,
    args: SeedArgs,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = client.seed(args.city, args.limit).await?;
    output::print_seed_result(&result, config);
    Ok(())
}
