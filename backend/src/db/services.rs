//! High-level event and booking operations.
//!
//! These functions are the write path of the application: they validate and
//! normalize input, derive slugs and check references before handing a
//! record to any [`FullRepository`] implementation.
//! Handlers and pages call these rather than the repository traits.

use tracing::{debug, info};

use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    Booking, BookingId, BookingRecord, BookingUpdate, Event, EventId, EventRecord, EventSummary,
    EventUpdate, NewBooking, NewEvent,
};
use crate::services::{
    derive_base_slug, normalize_date, normalize_email, normalize_time, resolve_unique_slug,
    validate_event_fields,
};

/// Check that the backing store is reachable.
pub async fn health_check(repo: &dyn FullRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

fn base_slug_for(title: &str) -> RepositoryResult<String> {
    let base = derive_base_slug(title);
    if base.is_empty() {
        return Err(RepositoryError::validation(
            "title",
            "Title must contain at least one letter or digit",
        ));
    }
    Ok(base)
}

/// Validate, normalize and store a new event.
///
/// The slug is always derived from the title and made unique; date and time
/// are brought to their canonical forms. Nothing is written if any step
/// fails.
pub async fn create_event(repo: &dyn FullRepository, input: NewEvent) -> RepositoryResult<Event> {
    let mut record = EventRecord::from(input);
    validate_event_fields(&mut record)?;

    let base = base_slug_for(&record.title)?;
    record.slug = resolve_unique_slug(repo, &base, None).await?;
    record.date = normalize_date(&record.date)?;
    record.time = normalize_time(&record.time)?;

    let event = repo
        .insert_event(record)
        .await
        .map_err(|e| e.with_operation("create_event"))?;
    info!(event_id = %event.id, slug = %event.slug, "Created event");
    Ok(event)
}

/// Apply a partial update to an existing event.
///
/// The slug is re-derived only when the title changed or the stored slug is
/// empty. Date and time are re-normalized only when their value changed, so
/// saving an untouched record is idempotent.
pub async fn update_event(
    repo: &dyn FullRepository,
    id: EventId,
    update: EventUpdate,
) -> RepositoryResult<Event> {
    let existing = repo.get_event(id).await?.ok_or_else(|| {
        RepositoryError::not_found_with_context(
            format!("Event {} not found", id),
            ErrorContext::new("update_event")
                .with_entity("event")
                .with_entity_id(id),
        )
    })?;
    let before = existing.to_record();

    let mut record = before.clone();
    record.apply(update);
    validate_event_fields(&mut record)?;

    if record.title != before.title || before.slug.is_empty() {
        let base = base_slug_for(&record.title)?;
        record.slug = resolve_unique_slug(repo, &base, Some(id)).await?;
    }
    if record.date != before.date {
        record.date = normalize_date(&record.date)?;
    }
    if record.time != before.time {
        record.time = normalize_time(&record.time)?;
    }

    if record == before {
        debug!(event_id = %id, "Event update is a no-op");
        return Ok(existing);
    }

    let event = repo
        .update_event(id, record)
        .await
        .map_err(|e| e.with_operation("update_event"))?;
    info!(event_id = %event.id, slug = %event.slug, "Updated event");
    Ok(event)
}

/// Exact slug lookup. The slug is expected to be canonical already.
pub async fn find_event_by_slug(
    repo: &dyn FullRepository,
    slug: &str,
) -> RepositoryResult<Option<Event>> {
    repo.find_event_by_slug(slug).await
}

/// All events, newest first.
pub async fn list_events(repo: &dyn FullRepository) -> RepositoryResult<Vec<Event>> {
    repo.list_events().await
}

/// Other events sharing at least one tag with the event at `slug`.
///
/// Returns an empty list when the slug is unknown.
pub async fn find_similar_events_by_slug(
    repo: &dyn FullRepository,
    slug: &str,
) -> RepositoryResult<Vec<EventSummary>> {
    let Some(event) = repo.find_event_by_slug(slug).await? else {
        debug!(slug, "No event for similar-events lookup");
        return Ok(Vec::new());
    };
    repo.find_events_sharing_tags(&event.tags, event.id).await
}

async fn ensure_event_exists(
    repo: &dyn FullRepository,
    event_id: EventId,
    operation: &str,
) -> RepositoryResult<()> {
    if repo.get_event(event_id).await?.is_none() {
        return Err(RepositoryError::reference(
            "Event does not exist",
            ErrorContext::new(operation)
                .with_entity("event")
                .with_entity_id(event_id)
                .with_field("eventId"),
        ));
    }
    Ok(())
}

/// Register an email for an event.
///
/// The email is validated first; the event must exist or nothing is
/// written.
pub async fn create_booking(
    repo: &dyn FullRepository,
    input: NewBooking,
) -> RepositoryResult<Booking> {
    let email = normalize_email(&input.email)?;
    ensure_event_exists(repo, input.event_id, "create_booking").await?;

    let booking = repo
        .insert_booking(BookingRecord {
            event_id: input.event_id,
            email,
        })
        .await
        .map_err(|e| e.with_operation("create_booking"))?;
    info!(booking_id = %booking.id, event_id = %booking.event_id, "Created booking");
    Ok(booking)
}

/// Apply a partial update to a booking.
///
/// The event reference is checked only when it changes.
pub async fn update_booking(
    repo: &dyn FullRepository,
    id: BookingId,
    update: BookingUpdate,
) -> RepositoryResult<Booking> {
    let existing = repo.get_booking(id).await?.ok_or_else(|| {
        RepositoryError::not_found_with_context(
            format!("Booking {} not found", id),
            ErrorContext::new("update_booking")
                .with_entity("booking")
                .with_entity_id(id),
        )
    })?;
    let before = existing.to_record();
    let mut record = before.clone();

    if let Some(email) = update.email {
        record.email = normalize_email(&email)?;
    }
    if let Some(event_id) = update.event_id {
        if event_id != before.event_id {
            ensure_event_exists(repo, event_id, "update_booking").await?;
        }
        record.event_id = event_id;
    }

    if record == before {
        return Ok(existing);
    }

    let booking = repo
        .update_booking(id, record)
        .await
        .map_err(|e| e.with_operation("update_booking"))?;
    info!(booking_id = %booking.id, "Updated booking");
    Ok(booking)
}

pub async fn count_bookings_for_event(
    repo: &dyn FullRepository,
    event_id: EventId,
) -> RepositoryResult<u64> {
    repo.count_bookings_for_event(event_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;

    fn sample(title: &str) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            description: "A day of talks".to_string(),
            overview: "Talks and workshops".to_string(),
            image: "https://img.example.com/a.png".to_string(),
            venue: "Main Hall".to_string(),
            location: "Berlin".to_string(),
            date: "2024-03-01T10:00:00Z".to_string(),
            time: "9:30".to_string(),
            mode: "offline".to_string(),
            audience: "Developers".to_string(),
            agenda: vec!["Keynote".to_string()],
            organizer: "DevEvent".to_string(),
            tags: vec!["rust".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_event_normalizes_fields() {
        let repo = LocalRepository::new();
        let event = create_event(&repo, sample("  Rust Conf 2024 ")).await.unwrap();

        assert_eq!(event.title, "Rust Conf 2024");
        assert_eq!(event.slug, "rust-conf-2024");
        assert_eq!(event.date, "2024-03-01");
        assert_eq!(event.time, "09:30");
    }

    #[tokio::test]
    async fn test_create_event_rejects_unsluggable_title() {
        let repo = LocalRepository::new();
        let err = create_event(&repo, sample("???")).await.unwrap_err();
        assert_eq!(err.field(), Some("title"));
        assert_eq!(repo.event_count(), 0);
    }

    #[tokio::test]
    async fn test_update_without_title_change_keeps_slug() {
        let repo = LocalRepository::new();
        let event = create_event(&repo, sample("Rust Conf")).await.unwrap();

        let updated = update_event(
            &repo,
            event.id,
            EventUpdate {
                venue: Some("Annex".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.slug, "rust-conf");
        assert_eq!(updated.venue, "Annex");
    }

    #[tokio::test]
    async fn test_update_booking_missing_id_is_not_found() {
        let repo = LocalRepository::new();
        let err = update_booking(&repo, BookingId::new(7), BookingUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
