#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use anyhow::anyhow;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use court_booking_api::models::booking::{Booking, BookingUpdate, NewBooking};
use court_booking_api::repositories::google_places_repo::GooglePlacesRepo;
use court_booking_api::repositories::BookingRepository;
use court_booking_api::{build_app, AppState};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-key";
pub const KNOWN_PLACE_ID: &str = "ChIJ-known-court";
pub const FAILING_QUERY: &str = "upstream failure";
/// More than the search limit, so the cap is observable.
pub const UPSTREAM_RESULT_POOL: usize = 12;

/// Stand-in for the bookings table.
#[derive(Default)]
pub struct InMemoryBookingRepo {
    bookings: Mutex<Vec<Booking>>,
    last_id: AtomicI32,
}

impl InMemoryBookingRepo {
    pub fn snapshot(&self) -> Vec<Booking> {
        self.bookings.lock().unwrap().clone()
    }
}

impl BookingRepository for InMemoryBookingRepo {
    fn create_booking<'a>(&'a self, booking: &'a NewBooking) -> BoxFuture<'a, anyhow::Result<i32>> {
        async move {
            let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.bookings.lock().unwrap().push(booking.clone().with_id(id));
            Ok(id)
        }.boxed()
    }

    fn list_bookings(&self) -> BoxFuture<'_, anyhow::Result<Vec<Booking>>> {
        async move { Ok(self.snapshot()) }.boxed()
    }

    fn list_bookings_by_user(&self, user_id: i32) -> BoxFuture<'_, anyhow::Result<Vec<Booking>>> {
        async move {
            Ok(self.snapshot().into_iter().filter(|b| b.user_id == user_id).collect())
        }.boxed()
    }

    fn update_booking<'a>(
        &'a self,
        id: i32,
        update: &'a BookingUpdate,
    ) -> BoxFuture<'a, anyhow::Result<u64>> {
        async move {
            let mut bookings = self.bookings.lock().unwrap();
            let mut updated = 0;
            for booking in bookings.iter_mut().filter(|b| b.id == id) {
                booking.court_no = update.court_no;
                booking.start_time = update.start_time;
                booking.end_time = update.end_time;
                updated += 1;
            }
            Ok(updated)
        }.boxed()
    }

    fn delete_booking(&self, id: i32) -> BoxFuture<'_, anyhow::Result<u64>> {
        async move {
            let mut bookings = self.bookings.lock().unwrap();
            let before = bookings.len();
            bookings.retain(|b| b.id != id);
            Ok((before - bookings.len()) as u64)
        }.boxed()
    }
}

/// Every call fails the way a dropped database connection would.
pub struct FailingBookingRepo;

impl BookingRepository for FailingBookingRepo {
    fn create_booking<'a>(&'a self, _booking: &'a NewBooking) -> BoxFuture<'a, anyhow::Result<i32>> {
        async { Err(anyhow!("connection refused")) }.boxed()
    }

    fn list_bookings(&self) -> BoxFuture<'_, anyhow::Result<Vec<Booking>>> {
        async { Err(anyhow!("connection refused")) }.boxed()
    }

    fn list_bookings_by_user(&self, _user_id: i32) -> BoxFuture<'_, anyhow::Result<Vec<Booking>>> {
        async { Err(anyhow!("connection refused")) }.boxed()
    }

    fn update_booking<'a>(
        &'a self,
        _id: i32,
        _update: &'a BookingUpdate,
    ) -> BoxFuture<'a, anyhow::Result<u64>> {
        async { Err(anyhow!("connection refused")) }.boxed()
    }

    fn delete_booking(&self, _id: i32) -> BoxFuture<'_, anyhow::Result<u64>> {
        async { Err(anyhow!("connection refused")) }.boxed()
    }
}

pub fn test_app(booking_repo: Arc<dyn BookingRepository>, places_base_url: &str) -> Router {
    let http_client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap();
    let places_repo = Arc::new(GooglePlacesRepo::new(
        http_client,
        TEST_API_KEY.to_string(),
        places_base_url.to_string(),
        400,
    ));
    build_app(AppState::new(booking_repo, places_repo))
}

/// App whose places upstream is never contacted.
pub fn bookings_app(booking_repo: Arc<dyn BookingRepository>) -> Router {
    test_app(booking_repo, "http://127.0.0.1:9/v1")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, headers, body)
}

pub async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    let value = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("body is not json ({}): {:?}", e, String::from_utf8_lossy(&body)));
    (status, value)
}

pub fn booking_body(court_no: i32) -> Value {
    json!({
        "place_id": "ChIJ-court",
        "court_no": court_no,
        "phone_no": "012-3456789",
        "email": "player@example.com",
        "start_time": "2025-03-01T10:00:00Z",
        "end_time": "2025-03-01T11:00:00Z",
    })
}

/// Serves a fake Places API on an ephemeral port and returns its base url.
pub async fn start_places_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(mock_places_api);

    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());
    tokio::spawn(server);

    format!("http://{}/v1", addr)
}

async fn mock_places_api(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some(TEST_API_KEY) {
        return (StatusCode::FORBIDDEN, "API key not valid").into_response();
    }
    let field_mask = headers
        .get("x-goog-fieldmask")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let path = uri.path();
    if method == Method::POST && path == "/v1/places:searchText" {
        if !field_mask.starts_with("places.id,places.displayName") {
            return (StatusCode::BAD_REQUEST, "field mask required").into_response();
        }
        let request: Value = serde_json::from_slice(&body).unwrap_or_default();
        if request["textQuery"] == FAILING_QUERY {
            return (StatusCode::INTERNAL_SERVER_ERROR, "backend error").into_response();
        }
        let limit = request["maxResultCount"].as_u64().unwrap_or(20) as usize;
        let places: Vec<Value> = (0..UPSTREAM_RESULT_POOL.min(limit))
            .map(search_result)
            .collect();
        return Json(json!({ "places": places })).into_response();
    }

    if method == Method::GET {
        if let Some(place_id) = path.strip_prefix("/v1/places/") {
            if !field_mask.contains("userRatingCount") {
                return (StatusCode::BAD_REQUEST, "field mask required").into_response();
            }
            if place_id == KNOWN_PLACE_ID {
                return Json(known_place()).into_response();
            }
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": { "code": 404, "status": "NOT_FOUND" } })),
            ).into_response();
        }
    }

    StatusCode::NOT_FOUND.into_response()
}

fn search_result(index: usize) -> Value {
    if index == 0 {
        // bare record, every optional field absent
        return json!({ "id": "place-0" });
    }
    json!({
        "id": format!("place-{}", index),
        "displayName": { "text": format!("Court Centre {}", index), "languageCode": "en" },
        "formattedAddress": format!("{} Jalan Sukan, Kuala Lumpur", index),
        "nationalPhoneNumber": "03-1234 5678",
        "rating": 4.5,
        "photos": [
            { "name": format!("places/place-{}/photos/front", index), "widthPx": 800 },
        ],
    })
}

fn known_place() -> Value {
    json!({
        "id": KNOWN_PLACE_ID,
        "displayName": { "text": "Arena Badminton KL" },
        "formattedAddress": "8 Jalan Raja Chulan, Kuala Lumpur",
        "nationalPhoneNumber": "03-2222 3333",
        "internationalPhoneNumber": "+60 3-2222 3333",
        "rating": 4.2,
        "userRatingCount": 318,
        "priceLevel": "PRICE_LEVEL_INEXPENSIVE",
        "location": { "latitude": 3.1486, "longitude": 101.7101 },
        "photos": [
            { "name": format!("places/{}/photos/a", KNOWN_PLACE_ID) },
            { "name": format!("places/{}/photos/b", KNOWN_PLACE_ID) },
        ],
    })
}
