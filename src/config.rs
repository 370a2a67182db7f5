use std::net::SocketAddr;
use clap::{ArgAction, Parser};

pub const PRODUCTION_ENVIRONMENT: &str = "production";

#[derive(Parser, Clone, Debug)]
#[clap(name = "court-booking-api", version)]
pub struct Config {
    /// Postgres connection string for the bookings database
    #[clap(env = "BOOKINGS_DATABASE", long)]
    pub database_url: String,

    #[clap(env = "GOOGLEPLACES_API_KEY", long, default_value = "")]
    pub google_places_api_key: String,

    #[clap(env, long, default_value = "0.0.0.0")]
    pub host: String,

    #[clap(env, long, default_value_t = 3000)]
    pub port: u16,

    /// `production` hands the router to the hosting platform instead of binding locally
    #[clap(env, long, default_value = "development")]
    pub environment: String,

    #[clap(env, long, default_value_t = num_cpus::get() as u32 * 2)]
    pub db_max_connections: u32,

    #[clap(env, long, default_value_t = 30)]
    pub db_connection_timeout_secs: u64,

    /// Postgres connections use TLS unless this is set to `false` for a local database
    #[clap(env, long, default_value_t = true, action = ArgAction::Set)]
    pub db_require_tls: bool,

    #[clap(env, long, default_value = "https://places.googleapis.com/v1")]
    pub places_api_base_url: String,

    #[clap(env, long, default_value_t = 400)]
    pub photo_max_px: u32,
}

impl Config {
    pub fn should_listen(&self) -> bool {
        !self.environment.eq_ignore_ascii_case(PRODUCTION_ENVIRONMENT)
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }
}
