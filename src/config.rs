use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::AuthSettings;

pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Configuration for the tablerank server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// HMAC secret for session tokens
    pub jwt_secret: Option<String>,
    /// Lifetime of session tokens and the session cookie, in minutes
    pub token_ttl_minutes: i64,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Google Maps API key; seeding is disabled without it
    pub places_api_key: Option<String>,
    /// Base URL of the Google Maps web services
    pub places_base_url: String,
    /// Pause between result pages of a nearby search, in milliseconds
    pub places_page_delay_ms: u64,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub token_ttl_minutes: Option<i64>,
    #[serde(default)]
    pub bcrypt_cost: Option<u32>,
    #[serde(default)]
    pub places_api_key: Option<String>,
    #[serde(default)]
    pub places_base_url: Option<String>,
    #[serde(default)]
    pub places_page_delay_ms: Option<u64>,
    /// Server URL used by the CLI client; ignored by the server
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug)]
#[clap(name = "tablerank", about = "Restaurant rating server")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 127.0.0.1:3000
    #[clap(long, env = "TABLERANK_BIND")]
    pub bind_address: Option<String>,

    /// Secret used to sign session tokens
    #[clap(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Session lifetime in minutes
    #[clap(long, env = "TOKEN_TTL_MINUTES")]
    pub token_ttl_minutes: Option<i64>,

    /// bcrypt cost for new password hashes
    #[clap(long, env = "BCRYPT_COST")]
    pub bcrypt_cost: Option<u32>,

    /// Google Maps API key used for seeding
    #[clap(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    pub places_api_key: Option<String>,

    /// Base URL of the Google Maps web services
    #[clap(long, env = "PLACES_BASE_URL")]
    pub places_base_url: Option<String>,

    /// Delay between nearby-search pages in milliseconds
    #[clap(long, env = "PLACES_PAGE_DELAY_MS")]
    pub places_page_delay_ms: Option<u64>,

    /// Debug mode
    #[clap(long, env = "TABLERANK_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            jwt_secret: update.jwt_secret.or(self.jwt_secret),
            token_ttl_minutes: update.token_ttl_minutes.unwrap_or(self.token_ttl_minutes),
            bcrypt_cost: update.bcrypt_cost.unwrap_or(self.bcrypt_cost),
            places_api_key: update.places_api_key.or(self.places_api_key),
            places_base_url: update.places_base_url.unwrap_or(self.places_base_url),
            places_page_delay_ms: update.places_page_delay_ms.unwrap_or(self.places_page_delay_ms),
        }
    }

    /// Returns the delay between nearby-search pages as a Duration
    pub fn places_page_delay(&self) -> Duration {
        Duration::from_millis(self.places_page_delay_ms)
    }

    /// Returns the JWT secret, refusing to run without a non-empty one
    pub fn require_jwt_secret(&self) -> Result<&str> {
        match self.jwt_secret.as_deref() {
            Some(secret) if !secret.trim().is_empty() => Ok(secret),
            _ => bail!("JWT_SECRET is not defined"),
        }
    }

    /// Builds the authentication settings for this configuration
    pub fn auth_settings(&self) -> Result<AuthSettings> {
        if !(4..=31).contains(&self.bcrypt_cost) {
            bail!("bcrypt_cost must be between 4 and 31, got {}", self.bcrypt_cost);
        }
        if self.token_ttl_minutes <= 0 {
            bail!("token_ttl_minutes must be positive, got {}", self.token_ttl_minutes);
        }
        Ok(AuthSettings {
            jwt_secret: self.require_jwt_secret()?.to_string(),
            token_ttl_minutes: self.token_ttl_minutes,
            bcrypt_cost: self.bcrypt_cost,
        })
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("tablerank.db".to_string(), |path| {
        path.join("tablerank.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        bind_address: "127.0.0.1:3000".to_string(),
        jwt_secret: None,
        token_ttl_minutes: 60,
        bcrypt_cost: 12,
        places_api_key: None,
        places_base_url: DEFAULT_PLACES_BASE_URL.to_string(),
        places_page_delay_ms: 2000,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        bind_address: args.bind_address,
        jwt_secret: args.jwt_secret,
        token_ttl_minutes: args.token_ttl_minutes,
        bcrypt_cost: args.bcrypt_cost,
        places_api_key: args.places_api_key,
        places_base_url: args.places_base_url,
        places_page_delay_ms: args.places_page_delay_ms,
        server_url: None,
    }
}

/// Returns the platform config directory if it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let path = match ProjectDirs::from("com", "tablerank", "tablerank") {
        Some(proj_dirs) => proj_dirs.config_dir().to_path_buf(),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            return None;
        }
    };

    if path.exists() {
        Some(path)
    } else {
        info!("Config path not found at {:?}, using defaults", path);
        None
    }
}

/// Returns the directory log files are written to, creating it if needed
pub fn get_log_dir_path() -> Option<PathBuf> {
    let path = ProjectDirs::from("com", "tablerank", "tablerank")?.data_local_dir().join("logs");

    match fs::create_dir_all(&path) {
        Ok(()) => Some(path),
        Err(e) => {
            eprintln!("Could not create log directory {:?}: {}", path, e);
            None
        }
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_dir = get_config_dir_path();
    let base = base_config(config_dir.clone());
    let file_update = config_from_file(config_dir.map(|dir| dir.join("config.toml"))).unwrap_or_default();

    let config = base
        .apply_update(file_update)
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, bind_address={}, token_ttl={}min, places_enabled={}",
        config.database_url,
        config.bind_address,
        config.token_ttl_minutes,
        config.places_api_key.is_some()
    );

    config
}
