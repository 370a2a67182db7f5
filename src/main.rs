use std::sync::Arc;
use clap::Parser;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use court_booking_api::config::Config;
use court_booking_api::controller::{serve, AppState};
use court_booking_api::repositories::google_places_repo::GooglePlacesRepo;
use court_booking_api::repositories::postgres_repo::connect_booking_repo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    info!("Starting court booking API in {} mode", config.environment);

    let booking_repo = connect_booking_repo(&config)?;

    let places_repo = Arc::new(GooglePlacesRepo::new(
        reqwest::Client::new(),
        config.google_places_api_key.clone(),
        config.places_api_base_url.clone(),
        config.photo_max_px,
    ));
    if !places_repo.has_api_key() {
        warn!("GOOGLEPLACES_API_KEY is missing, places lookups will be rejected upstream");
    }

    serve(AppState::new(booking_repo, places_repo), &config).await
}
