use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tablerank::config::{get_config, get_log_dir_path, CliArgs};
use tablerank::logging::init_logging;
use tablerank::places::PlacesClient;
use tablerank::{create_app, db, run_migrations, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before clap reads them
    if dotenv::dotenv().is_ok() {
        println!("Loaded .env file");
    }

    let args = CliArgs::parse();

    let log_dir = get_log_dir_path();
    let _guard = init_logging(args.debug, log_dir.as_deref());

    let config = get_config(args);
    let auth = config.auth_settings()?;

    let pool = db::init_pool(&config.database_url)?;
    {
        let mut conn = pool.get().context("Failed to get connection for migrations")?;
        run_migrations(&mut conn)?;
    }
    info!("Database ready at {}", config.database_url);

    let places = match config.places_api_key.clone() {
        Some(api_key) => Some(PlacesClient::new(
            api_key,
            config.places_base_url.clone(),
            config.places_page_delay(),
        )),
        None => {
            warn!("GOOGLE_MAPS_API_KEY is not set, seeding is disabled");
            None
        }
    };

    let app = create_app(AppState::new(Arc::new(pool), auth, places));

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
