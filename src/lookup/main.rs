//! Browse the lists the registration form picks from.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ecoleta::backend::PointsApi;
use ecoleta::config::{Config, GeographyConfig, API_URL_ENV};
use ecoleta::geography::GeographyLookup;
use ecoleta::LocationPicker;

#[derive(Parser, Debug)]
#[command(name = "lookup")]
#[command(about = "List states, cities and collection categories")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ecoleta API base URL, needed for `categories`
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// All states, ordered by name
    States,
    /// Cities of one state, ordered by name
    Cities {
        /// State code or name
        state: String,
    },
    /// Collection categories offered by the backend
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = if args.config.is_some() || args.api_url.is_some() {
        Some(Config::resolve(args.config.as_deref(), args.api_url.as_deref())?)
    } else {
        None
    };

    let geography = match &config {
        Some(config) => config.geography_client()?,
        None => GeographyConfig::default().client()?,
    };

    match args.command {
        Command::States => {
            let states = geography.divisions().await?;
            print_rows(args.json, &states, |s| format!("{:<4} {}", s.code, s.name))?;
        }
        Command::Cities { state } => {
            let picker = LocationPicker::new(Arc::new(geography));
            picker.load_divisions().await?;
            let division = picker
                .find_division(&state)
                .with_context(|| format!("Unknown state: {}", state))?;

            picker.select_division(&division.code).await?;
            let cities = picker.sub_division_options();
            info!("{} cities in {}", cities.len(), division.name);
            print_rows(args.json, &cities, |c| format!("{:<8} {}", c.id, c.name))?;
        }
        Command::Categories => {
            let config = config
                .with_context(|| format!("Categories need --api-url or {}", API_URL_ENV))?;
            let categories = config.backend_client()?.categories().await?;
            print_rows(args.json, &categories, |c| {
                format!("{:<4} {:<24} {}", c.id, c.name, c.image_url)
            })?;
        }
    }

    Ok(())
}

fn print_rows<T: Serialize>(json: bool, rows: &[T], line: impl Fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
    } else {
        for row in rows {
            println!("{}", line(row));
        }
    }
    Ok(())
}
