use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_service_descriptor))
        .route("/health", get(get_health_check))
}

#[derive(Serialize, Clone, Debug)]
pub struct ServiceDescriptor {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Serialize, Clone, Debug)]
pub struct Endpoints {
    pub places: &'static str,
    pub bookings: &'static str,
}

async fn get_service_descriptor() -> Json<ServiceDescriptor> {
    Json(ServiceDescriptor {
        message: "Sport Facility API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            places: "/api/places",
            bookings: "/bookings",
        },
    })
}

/// Misc endpoint for uptime monitors
async fn get_health_check() -> Result<StatusCode, StatusCode>
{
    Ok(StatusCode::OK)
}
