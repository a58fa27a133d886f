mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::TablerankClient;
use output::{OutputConfig, OutputFormat};
use std::process;
use tablerank::config;

/// CLI for the tablerank restaurant rating server
#[derive(Parser, Debug)]
#[clap(name = "tablerank-cli", about = "CLI for the tablerank restaurant rating server")]
struct Cli {
    /// Server URL to connect to
    #[clap(long = "server", env = "TABLERANK_URL", global = true)]
    server_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Browse restaurants and rankings
    #[command(subcommand)]
    Restaurant(commands::restaurant::RestaurantCommands),
    /// List and add ratings
    #[command(subcommand)]
    Rating(commands::rating::RatingCommands),
    /// Seed restaurants of a city from Google Places
    Seed(commands::seed::SeedArgs),
}

const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Picks the server URL: `--server` or `TABLERANK_URL`, then `server_url`
/// from the config file, then `DEFAULT_SERVER_URL`
fn resolve_server_url(cli_url: Option<String>) -> String {
    cli_url
        .or_else(|| {
            let path = config::get_config_dir_path()?.join("config.toml");
            config::config_from_file(Some(path)).ok()?.server_url
        })
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!("Could not connect to server. Is tablerank running?\n  {}", err_string);
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = TablerankClient::new(server_url);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Restaurant(cmd) => commands::restaurant::execute(&client, cmd, &output_config).await,
        Commands::Rating(cmd) => commands::rating::execute(&client, cmd, &output_config).await,
        Commands::Seed(args) => commands::seed::execute(&client, args, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
