use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Booking {
    pub id: i32,
    pub place_id: String,
    pub court_no: i32,
    pub phone_no: Option<String>,
    pub email: Option<String>,
    pub user_id: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

/// A booking that has not been assigned an id by the store yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewBooking {
    pub place_id: String,
    pub court_no: i32,
    pub phone_no: Option<String>,
    pub email: Option<String>,
    pub user_id: i32,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
}

impl NewBooking {
    pub fn with_id(self, id: i32) -> Booking {
        Booking {
            id,
            place_id: self.place_id,
            court_no: self.court_no,
            phone_no: self.phone_no,
            email: self.email,
            user_id: self.user_id,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// The only columns the update path is allowed to touch.
#[derive(Clone, Debug, PartialEq)]
pub struct BookingUpdate {
    pub court_no: i32,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
}
