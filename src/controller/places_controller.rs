use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use crate::controller::responses::{error_response, ProxyErrorResponse};
use crate::models::place::{PlaceDetails, PlaceSummary};
use crate::repositories::google_places_repo::GooglePlacesRepo;

pub fn router(places_repo: Arc<GooglePlacesRepo>) -> Router {
    Router::new()
        .route("/search", get(search_places))
        .route("/details", get(missing_place_id))
        .route("/details/", get(missing_place_id))
        .route("/details/:place_id", get(get_place_details))
        .route_layer(Extension(places_repo))
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct SearchPlacesQuery {
    pub query: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SearchPlacesResponse {
    pub success: bool,
    pub count: usize,
    pub places: Vec<PlaceSummary>,
}

#[derive(Serialize, Clone, Debug)]
pub struct PlaceDetailsResponse {
    pub success: bool,
    pub place: PlaceDetails,
}

/// GET /api/places/search?query=badminton+court+kuala+lumpur
pub async fn search_places(
    Extension(places_repo): Extension<Arc<GooglePlacesRepo>>,
    Query(params): Query<SearchPlacesQuery>,
) -> impl IntoResponse {
    info!("Search query received: {:?}", params.query);
    let query = match params.query.filter(|query| !query.is_empty()) {
        Some(query) => query,
        None => return error_response(StatusCode::BAD_REQUEST, "Query parameter is required"),
    };

    return match places_repo.search_places(&query).await {
        Ok(places) => {
            (
                StatusCode::OK,
                Json(SearchPlacesResponse {
                    success: true,
                    count: places.len(),
                    places,
                }),
            ).into_response()
        }
        Err(e) => {
            error!("Search places error: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProxyErrorResponse {
                    success: false,
                    error: format!("Failed to search places: {}", e),
                }),
            ).into_response()
        }
    };
}

/// GET /api/places/details/:place_id
pub async fn get_place_details(
    Extension(places_repo): Extension<Arc<GooglePlacesRepo>>,
    Path(place_id): Path<String>,
) -> impl IntoResponse {
    info!("Place ID received: {}", place_id);
    if place_id.trim().is_empty() {
        return missing_place_id().await.into_response();
    }

    return match places_repo.get_place_details(&place_id).await {
        Ok(place) => {
            (
                StatusCode::OK,
                Json(PlaceDetailsResponse {
                    success: true,
                    place,
                }),
            ).into_response()
        }
        Err(e) => {
            error!("Get place details error for {}: {:#}", place_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProxyErrorResponse {
                    success: false,
                    error: "Failed to get place details".to_string(),
                }),
            ).into_response()
        }
    };
}

async fn missing_place_id() -> impl IntoResponse {
    error_response(StatusCode::BAD_REQUEST, "Place ID is required")
}
