//! Collection point registration.
//!
//! Loads states, cities and categories, applies the choices given on the
//! command line the way the registration page would, and submits the point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ecoleta::config::{Config, API_URL_ENV};
use ecoleta::models::{Coordinate, FormField, ImageFile};
use ecoleta::page::{RegistrationPage, SubmitError};

#[derive(Parser, Debug)]
#[command(name = "register")]
#[command(about = "Register a waste-collection point")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ecoleta API base URL (overrides the config file)
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Establishment name
    #[arg(long)]
    summary: String,

    #[arg(long)]
    email: String,

    #[arg(long, default_value = "")]
    phone: String,

    /// State code or name, e.g. "SP"
    #[arg(long)]
    state: String,

    /// City id or name
    #[arg(long)]
    city: String,

    /// Point location as "lat,lon"
    #[arg(long, allow_hyphen_values = true, conflicts_with = "here")]
    point: Option<Coordinate>,

    /// Use the device position as the point location
    #[arg(long)]
    here: bool,

    /// Category id (repeatable)
    #[arg(long = "category", required = true)]
    categories: Vec<u32>,

    /// Photo of the collection point
    #[arg(long)]
    image: Option<PathBuf>,

    /// Print the assembled fields instead of submitting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::resolve(args.config.as_deref(), args.api_url.as_deref())?;

    info!("Ecoleta point registration");
    info!("Backend: {}", config.api.base_url);

    let geography = Arc::new(config.geography_client()?);
    let backend = Arc::new(config.backend_client()?);
    let position = config.geolocation.source()?;

    let mut page = RegistrationPage::new(geography, backend)
        .with_geolocation_timeout(config.geolocation.timeout());

    let report = page.mount(&position).await;
    if report.divisions.is_failed() {
        anyhow::bail!("Unable to load states ({:?}); try again later", report.divisions);
    }
    if report.categories.is_failed() {
        anyhow::bail!("Unable to load categories ({:?}); try again later", report.categories);
    }

    // Text fields
    page.set_field(FormField::Summary, &args.summary);
    page.set_field(FormField::Email, &args.email);
    page.set_field(FormField::Phone, &args.phone);

    if let Some(path) = &args.image {
        page.attach_image(ImageFile::load(path).await?);
    }

    // State, then city from the freshly loaded list
    let picker = page.picker().clone();
    let state = picker
        .find_division(&args.state)
        .with_context(|| format!("Unknown state: {}", args.state))?;
    picker.select_division(&state.code).await?;

    let city = picker
        .find_sub_division(&args.city)
        .with_context(|| format!("Unknown city in {}: {}", state.code, args.city))?;
    picker.select_sub_division(&city.code());
    info!("Location: {} / {}", state.name, city.name);

    // Map click
    let point = match (args.point, args.here) {
        (Some(point), _) => Some(point),
        (None, true) => report.viewport_center,
        (None, false) => None,
    };
    match point {
        Some(p) => picker.record_point_selection(p.latitude, p.longitude),
        None if args.here => warn!("Device position unavailable; no point selected"),
        None => warn!("No point given; pass --point or --here"),
    }

    for id in &args.categories {
        page.toggle_category(*id);
    }

    if args.dry_run {
        let submission = page.assemble()?;
        for (name, value) in submission.fields() {
            println!("{:>10}: {}", name, value);
        }
        if let Some(image) = &submission.image {
            println!("{:>10}: {} ({}, {} bytes)", "image", image.file_name, image.mime, image.bytes.len());
        }
        return Ok(());
    }

    match page.submit().await {
        Ok(route) => {
            info!("Collection point created, back to {}", route);
            Ok(())
        }
        Err(SubmitError::Form(e)) => Err(e.into()),
        Err(e) => {
            warn!("Nothing was saved; the form is unchanged");
            Err(e.into())
        }
    }
}
