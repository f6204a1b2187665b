//! In-memory repository used for tests and local development.
//!
//! All state lives behind a single [`RwLock`], so every write observes the
//! slug index as of the moment it commits.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::db::repository::{
    BookingRepository, ErrorContext, EventRepository, RepositoryError, RepositoryResult,
};
use crate::models::{
    Booking, BookingId, BookingRecord, Event, EventId, EventRecord, EventSummary,
};

#[derive(Debug, Default)]
struct LocalStore {
    events: BTreeMap<EventId, Event>,
    bookings: BTreeMap<BookingId, Booking>,
    next_event_id: i64,
    next_booking_id: i64,
}

impl LocalStore {
    fn slug_taken(&self, slug: &str, exclude: Option<EventId>) -> bool {
        self.events
            .values()
            .any(|e| e.slug == slug && Some(e.id) != exclude)
    }
}

/// Process-local repository backed by ordered maps.
#[derive(Debug, Default)]
pub struct LocalRepository {
    store: RwLock<LocalStore>,
    total_queries: AtomicU64,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of storage operations served so far.
    pub fn query_count(&self) -> u64 {
        self.total_queries.load(Ordering::Relaxed)
    }

    pub fn event_count(&self) -> usize {
        self.store.read().events.len()
    }

    pub fn booking_count(&self) -> usize {
        self.store.read().bookings.len()
    }

    fn record_query(&self) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
    }
}

fn duplicate_slug(operation: &str, slug: &str) -> RepositoryError {
    RepositoryError::query_with_context(
        format!("duplicate key value violates unique constraint on slug '{}'", slug),
        ErrorContext::new(operation)
            .with_entity("event")
            .with_details("unique_violation constraint=events_slug_key"),
    )
}

fn apply_record(event: &mut Event, record: EventRecord) {
    event.title = record.title;
    event.slug = record.slug;
    event.description = record.description;
    event.overview = record.overview;
    event.image = record.image;
    event.venue = record.venue;
    event.location = record.location;
    event.date = record.date;
    event.time = record.time;
    event.mode = record.mode;
    event.audience = record.audience;
    event.agenda = record.agenda;
    event.organizer = record.organizer;
    event.tags = record.tags;
}

#[async_trait]
impl EventRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn insert_event(&self, record: EventRecord) -> RepositoryResult<Event> {
        self.record_query();
        let mut store = self.store.write();
        if store.slug_taken(&record.slug, None) {
            return Err(duplicate_slug("insert_event", &record.slug));
        }

        store.next_event_id += 1;
        let now = Utc::now();
        let mut event = Event {
            id: EventId::new(store.next_event_id),
            title: String::new(),
            slug: String::new(),
            description: String::new(),
            overview: String::new(),
            image: String::new(),
            venue: String::new(),
            location: String::new(),
            date: String::new(),
            time: String::new(),
            mode: String::new(),
            audience: String::new(),
            agenda: Vec::new(),
            organizer: String::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        apply_record(&mut event, record);
        store.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: EventId, record: EventRecord) -> RepositoryResult<Event> {
        self.record_query();
        let mut store = self.store.write();
        if store.slug_taken(&record.slug, Some(id)) {
            return Err(duplicate_slug("update_event", &record.slug));
        }

        let event = store.events.get_mut(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Event {} not found", id),
                ErrorContext::new("update_event")
                    .with_entity("event")
                    .with_entity_id(id),
            )
        })?;
        apply_record(event, record);
        event.updated_at = Utc::now();
        Ok(event.clone())
    }

    async fn get_event(&self, id: EventId) -> RepositoryResult<Option<Event>> {
        self.record_query();
        Ok(self.store.read().events.get(&id).cloned())
    }

    async fn find_event_by_slug(&self, slug: &str) -> RepositoryResult<Option<Event>> {
        self.record_query();
        Ok(self
            .store
            .read()
            .events
            .values()
            .find(|e| e.slug == slug)
            .cloned())
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<EventId>) -> RepositoryResult<bool> {
        self.record_query();
        Ok(self.store.read().slug_taken(slug, exclude))
    }

    async fn list_events(&self) -> RepositoryResult<Vec<Event>> {
        self.record_query();
        let mut events: Vec<Event> = self.store.read().events.values().cloned().collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(events)
    }

    async fn find_events_sharing_tags(
        &self,
        tags: &[String],
        exclude: EventId,
    ) -> RepositoryResult<Vec<EventSummary>> {
        self.record_query();
        Ok(self
            .store
            .read()
            .events
            .values()
            .filter(|e| e.id != exclude)
            .filter(|e| !e.image.is_empty() && !e.slug.is_empty())
            .filter(|e| e.shares_tag_with(tags))
            .map(Event::summary)
            .collect())
    }
}

#[async_trait]
impl BookingRepository for LocalRepository {
    async fn insert_booking(&self, record: BookingRecord) -> RepositoryResult<Booking> {
        self.record_query();
        let mut store = self.store.write();
        store.next_booking_id += 1;
        let now = Utc::now();
        let booking = Booking {
            id: BookingId::new(store.next_booking_id),
            event_id: record.event_id,
            email: record.email,
            created_at: now,
            updated_at: now,
        };
        store.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_booking(
        &self,
        id: BookingId,
        record: BookingRecord,
    ) -> RepositoryResult<Booking> {
        self.record_query();
        let mut store = self.store.write();
        let booking = store.bookings.get_mut(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Booking {} not found", id),
                ErrorContext::new("update_booking")
                    .with_entity("booking")
                    .with_entity_id(id),
            )
        })?;
        booking.event_id = record.event_id;
        booking.email = record.email;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn get_booking(&self, id: BookingId) -> RepositoryResult<Option<Booking>> {
        self.record_query();
        Ok(self.store.read().bookings.get(&id).cloned())
    }

    async fn count_bookings_for_event(&self, event_id: EventId) -> RepositoryResult<u64> {
        self.record_query();
        Ok(self
            .store
            .read()
            .bookings
            .values()
            .filter(|b| b.event_id == event_id)
            .count() as u64)
    }
}
