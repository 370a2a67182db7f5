pub mod booking;
pub mod place;
