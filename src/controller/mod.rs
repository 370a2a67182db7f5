use std::sync::Arc;
use anyhow::Context;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::repositories::google_places_repo::GooglePlacesRepo;
use crate::repositories::BookingRepository;

pub mod booking_controller;
pub mod health_check;
pub mod places_controller;
pub mod principal;
pub mod responses;

/// Everything the handlers need, built once at startup and handed to each router.
#[derive(Clone)]
pub struct AppState {
    pub booking_repo: Arc<dyn BookingRepository>,
    pub places_repo: Arc<GooglePlacesRepo>,
}

impl AppState {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        places_repo: Arc<GooglePlacesRepo>,
    ) -> Self {
        Self {
            booking_repo,
            places_repo,
        }
    }
}

pub async fn serve(
    app_state: AppState,
    config: &Config,
) -> anyhow::Result<()> {
    let application = build_app(app_state);

    if !config.should_listen() {
        info!(
            "Environment is {}, local listener disabled; the hosting platform drives the router",
            config.environment
        );
        return Ok(());
    }

    let addr = config.listen_addr()?;
    info!("API server listening on: {}", addr);
    axum::Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind API server to {}", addr))?
        .serve(application.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Error spinning up the API server")
}

/// The full HTTP surface with middleware applied.
pub fn build_app(app_state: AppState) -> Router {
    router_endpoints(app_state)
        .fallback(page_not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_methods(Any)
                        .allow_origin(Any)
                        .allow_headers(Any)
                )
                .layer(CompressionLayer::new())
        )
}

pub fn router_endpoints(app_state: AppState) -> Router {
    Router::new()
        .merge(health_check::router())
        .merge(booking_controller::router(app_state.booking_repo))
        .nest("/api/places", places_controller::router(app_state.places_repo))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            futures::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                futures::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = futures::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
