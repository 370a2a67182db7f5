use futures::future::BoxFuture;
use crate::models::booking::{Booking, BookingUpdate, NewBooking};

pub mod google_places_repo;
pub mod postgres_repo;

/// Storage operations the booking handlers depend on. Each call is a single
/// statement; errors come back untyped and are never retried here.
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking and returns the id the store assigned to it.
    fn create_booking<'a>(&'a self, booking: &'a NewBooking) -> BoxFuture<'a, anyhow::Result<i32>>;

    fn list_bookings(&self) -> BoxFuture<'_, anyhow::Result<Vec<Booking>>>;

    fn list_bookings_by_user(&self, user_id: i32) -> BoxFuture<'_, anyhow::Result<Vec<Booking>>>;

    /// Returns the number of rows touched, which is zero for an unknown id.
    fn update_booking<'a>(
        &'a self,
        id: i32,
        update: &'a BookingUpdate,
    ) -> BoxFuture<'a, anyhow::Result<u64>>;

    fn delete_booking(&self, id: i32) -> BoxFuture<'_, anyhow::Result<u64>>;
}
