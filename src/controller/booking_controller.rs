use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{error, info, warn};
use crate::controller::principal::CurrentUser;
use crate::controller::responses::{error_response, DataResponse, MessageResponse, StatusResponse};
use crate::models::booking::{BookingUpdate, NewBooking};
use crate::repositories::BookingRepository;

pub fn router(booking_repo: Arc<dyn BookingRepository>) -> Router {
    Router::new()
        .route("/bookings", post(create_booking).get(get_all_bookings))
        .route("/bookings/:id", put(update_booking).delete(delete_booking))
        .route("/users/:user_id/bookings", get(get_user_bookings))
        .route_layer(Extension(booking_repo))
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CreateBookingRequest {
    pub place_id: Option<String>,
    pub court_no: Option<i32>,
    pub phone_no: Option<String>,
    pub email: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
}

impl CreateBookingRequest {
    /// Any `user_id` in the body is ignored; ownership comes from `current_user`.
    /// Only presence is checked, not time ordering or overlap.
    pub fn into_new_booking(self, current_user: CurrentUser) -> Result<NewBooking, String> {
        let place_id = self.place_id.filter(|id| !id.trim().is_empty());

        let mut missing = Vec::new();
        if place_id.is_none() {
            missing.push("place_id");
        }
        if self.court_no.is_none() {
            missing.push("court_no");
        }
        if self.start_time.is_none() {
            missing.push("start_time");
        }
        if self.end_time.is_none() {
            missing.push("end_time");
        }

        match (place_id, self.court_no, self.start_time, self.end_time) {
            (Some(place_id), Some(court_no), Some(start_time), Some(end_time)) => Ok(NewBooking {
                place_id,
                court_no,
                phone_no: self.phone_no,
                email: self.email,
                user_id: current_user.user_id,
                start_time,
                end_time,
            }),
            _ => Err(missing_fields_message(&missing)),
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct UpdateBookingRequest {
    pub court_no: Option<i32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
}

impl UpdateBookingRequest {
    pub fn into_update(self) -> Result<BookingUpdate, String> {
        match (self.court_no, self.start_time, self.end_time) {
            (Some(court_no), Some(start_time), Some(end_time)) => Ok(BookingUpdate {
                court_no,
                start_time,
                end_time,
            }),
            (court_no, start_time, end_time) => {
                let missing: Vec<&str> = [
                    ("court_no", court_no.is_none()),
                    ("start_time", start_time.is_none()),
                    ("end_time", end_time.is_none()),
                ]
                    .into_iter()
                    .filter_map(|(field, absent)| absent.then_some(field))
                    .collect();
                Err(missing_fields_message(&missing))
            }
        }
    }
}

fn missing_fields_message(missing: &[&str]) -> String {
    format!("Missing required fields: {}", missing.join(", "))
}

pub async fn create_booking(
    Extension(booking_repo): Extension<Arc<dyn BookingRepository>>,
    current_user: CurrentUser,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> impl IntoResponse {
    let new_booking = match payload
        .map_err(|rejection| rejection.body_text())
        .and_then(|Json(body)| body.into_new_booking(current_user))
    {
        Ok(new_booking) => new_booking,
        Err(e) => {
            warn!("Rejected booking request: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e);
        }
    };

    let create_booking_res = booking_repo
        .create_booking(&new_booking)
        .await;

    return match create_booking_res {
        Ok(id) => {
            info!("Booking created with id {}", id);
            (
                StatusCode::OK,
                Json(DataResponse {
                    status: "Success",
                    data: new_booking.with_id(id),
                    message: "Bookings created".to_string(),
                }),
            ).into_response()
        }
        Err(e) => {
            error!("Something went wrong creating booking due to: {:#}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create booking. Please try again.",
            )
        }
    };
}

/// Every booking in the store, unfiltered. Meant for admin tooling.
pub async fn get_all_bookings(
    Extension(booking_repo): Extension<Arc<dyn BookingRepository>>,
) -> impl IntoResponse {
    return match booking_repo.list_bookings().await {
        Ok(bookings) => {
            info!("Retrieved all bookings");
            (StatusCode::OK, Json(bookings)).into_response()
        }
        Err(e) => {
            error!("Something went wrong retrieving bookings due to: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "An error has occurred.").into_response()
        }
    };
}

/// An empty result is reported as an unknown user, there is no users table to tell
/// the two cases apart.
pub async fn get_user_bookings(
    Extension(booking_repo): Extension<Arc<dyn BookingRepository>>,
    Path(user_id): Path<i32>,
) -> impl IntoResponse {
    let user_bookings_res = booking_repo
        .list_bookings_by_user(user_id)
        .await;

    return match user_bookings_res {
        Ok(bookings) if bookings.is_empty() => {
            (
                StatusCode::NOT_FOUND,
                Json(MessageResponse { message: "User not found.".to_string() }),
            ).into_response()
        }
        Ok(bookings) => {
            (
                StatusCode::OK,
                Json(DataResponse {
                    status: "Success",
                    data: bookings,
                    message: format!("Here are the bookings by user {}.", user_id),
                }),
            ).into_response()
        }
        Err(e) => {
            error!("Something went wrong retrieving bookings for user {} due to: {:#}", user_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "An error has occurred.").into_response()
        }
    };
}

/// Reports success whether or not a row with `id` exists.
pub async fn update_booking(
    Extension(booking_repo): Extension<Arc<dyn BookingRepository>>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateBookingRequest>, JsonRejection>,
) -> impl IntoResponse {
    let update = match payload
        .map_err(|rejection| rejection.body_text())
        .and_then(|Json(body)| body.into_update())
    {
        Ok(update) => update,
        Err(e) => {
            warn!("Rejected update for booking {}: {}", id, e);
            return error_response(StatusCode::BAD_REQUEST, e);
        }
    };

    return match booking_repo.update_booking(id, &update).await {
        Ok(rows) => {
            info!("Updated booking with id {} ({} rows)", id, rows);
            (
                StatusCode::OK,
                Json(StatusResponse {
                    status: "success",
                    message: "Booking updated successfully".to_string(),
                }),
            ).into_response()
        }
        Err(e) => {
            error!("Something went wrong updating booking {} due to: {:#}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    };
}

/// Physical delete. Reports success whether or not a row with `id` exists.
pub async fn delete_booking(
    Extension(booking_repo): Extension<Arc<dyn BookingRepository>>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    return match booking_repo.delete_booking(id).await {
        Ok(rows) => {
            info!("Successfully deleted booking with id {} ({} rows)", id, rows);
            (
                StatusCode::OK,
                Json(StatusResponse {
                    status: "success",
                    message: "Booking deleted successfully.".to_string(),
                }),
            ).into_response()
        }
        Err(e) => {
            error!("Something went wrong deleting booking {} due to: {:#}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    };
}
