//! Repository traits implemented by every storage backend.
//!
//! The traits only cover storage primitives. Slug derivation, field
//! normalization and reference checks live in [`crate::db::services`], which
//! works against any implementation.

use async_trait::async_trait;

use crate::models::{
    Booking, BookingId, BookingRecord, Event, EventId, EventRecord, EventSummary,
};

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Storage operations over event records.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Insert a new event, assigning its id and timestamps.
    ///
    /// Implementations must reject a slug that is already taken: this is the
    /// authoritative uniqueness guarantee.
    async fn insert_event(&self, record: EventRecord) -> RepositoryResult<Event>;

    /// Overwrite the writable fields of an existing event and bump `updated_at`.
    async fn update_event(&self, id: EventId, record: EventRecord) -> RepositoryResult<Event>;

    async fn get_event(&self, id: EventId) -> RepositoryResult<Option<Event>>;

    /// Exact slug lookup.
    async fn find_event_by_slug(&self, slug: &str) -> RepositoryResult<Option<Event>>;

    /// Whether `slug` is used by any event other than `exclude`.
    async fn slug_exists(&self, slug: &str, exclude: Option<EventId>) -> RepositoryResult<bool>;

    /// All events, newest `created_at` first.
    async fn list_events(&self) -> RepositoryResult<Vec<Event>>;

    /// Events other than `exclude` that share at least one of `tags` and have
    /// both a non-empty image and a non-empty slug.
    async fn find_events_sharing_tags(
        &self,
        tags: &[String],
        exclude: EventId,
    ) -> RepositoryResult<Vec<EventSummary>>;
}

/// Storage operations over booking records.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert_booking(&self, record: BookingRecord) -> RepositoryResult<Booking>;

    async fn update_booking(
        &self,
        id: BookingId,
        record: BookingRecord,
    ) -> RepositoryResult<Booking>;

    async fn get_booking(&self, id: BookingId) -> RepositoryResult<Option<Booking>>;

    async fn count_bookings_for_event(&self, event_id: EventId) -> RepositoryResult<u64>;
}

/// Everything the application needs from a backend.
pub trait FullRepository: EventRepository + BookingRepository {}

impl<T: EventRepository + BookingRepository> FullRepository for T {}
