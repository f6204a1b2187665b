use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{bookings, events};
use crate::models::{
    Booking, BookingId, BookingRecord, Event, EventId, EventRecord, EventSummary,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRow {
    pub event_id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: EventId::new(row.event_id),
            title: row.title,
            slug: row.slug,
            description: row.description,
            overview: row.overview,
            image: row.image,
            venue: row.venue,
            location: row.location,
            date: row.date,
            time: row.time,
            mode: row.mode,
            audience: row.audience,
            agenda: row.agenda,
            organizer: row.organizer,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventSummaryRow {
    pub title: String,
    pub image: String,
    pub slug: String,
    pub location: String,
    pub date: String,
    pub time: String,
}

impl From<EventSummaryRow> for EventSummary {
    fn from(row: EventSummaryRow) -> Self {
        EventSummary {
            title: row.title,
            image: row.image,
            slug: row.slug,
            location: row.location,
            date: row.date,
            time: row.time,
        }
    }
}

/// Column values written by both inserts and updates.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = events)]
pub struct EventChangeset {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

impl From<EventRecord> for EventChangeset {
    fn from(record: EventRecord) -> Self {
        EventChangeset {
            title: record.title,
            slug: record.slug,
            description: record.description,
            overview: record.overview,
            image: record.image,
            venue: record.venue,
            location: record.location,
            date: record.date,
            time: record.time,
            mode: record.mode,
            audience: record.audience,
            agenda: record.agenda,
            organizer: record.organizer,
            tags: record.tags,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookingRow {
    pub booking_id: i64,
    pub event_id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: BookingId::new(row.booking_id),
            event_id: EventId::new(row.event_id),
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = bookings)]
pub struct BookingChangeset {
    pub event_id: i64,
    pub email: String,
}

impl From<BookingRecord> for BookingChangeset {
    fn from(record: BookingRecord) -> Self {
        BookingChangeset {
            event_id: record.event_id.value(),
            email: record.email,
        }
    }
}
