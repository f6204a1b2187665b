use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::EventId;
use crate::define_id_type;

define_id_type!(BookingId);

/// An email registration for an event.
///
/// `event_id` is a plain reference: it is checked when the booking is
/// written, and bookings are not removed when their event goes away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub event_id: EventId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn to_record(&self) -> BookingRecord {
        BookingRecord {
            event_id: self.event_id,
            email: self.email.clone(),
        }
    }
}

/// Caller-supplied fields for a new booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub event_id: EventId,
    pub email: String,
}

/// Partial update of a booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingUpdate {
    pub event_id: Option<EventId>,
    pub email: Option<String>,
}

/// Normalized booking fields as handed to a repository for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRecord {
    pub event_id: EventId,
    pub email: String,
}
