mod api;
mod dataset;
mod settings;
mod web;

use anyhow::{Context, Result};
use clap::Parser;
use settings::{Args, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::dataset::Dataset;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_file(&args.config)
        .with_context(|| format!("failed to load settings from {}", args.config.display()))?;

    let dataset = Dataset::load(&settings.data.orders, &settings.data.geolocations)?;

    let schema = api::schema(dataset);
    info!(address = %settings.web.address, "serving GraphQL");
    web::serve(schema, settings.web.address).await;
    Ok(())
}
