//! Integration tests for booking creation and updates.

use devevent::db::repositories::LocalRepository;
use devevent::db::repository::RepositoryError;
use devevent::db::services;
use devevent::models::{BookingUpdate, EventId, NewBooking, NewEvent};

async fn seed_event(repo: &LocalRepository, title: &str) -> EventId {
    let input = NewEvent {
        title: title.to_string(),
        description: "desc".to_string(),
        overview: "overview".to_string(),
        image: "https://img.example.com/x.png".to_string(),
        venue: "venue".to_string(),
        location: "Remote".to_string(),
        date: "2024-09-01".to_string(),
        time: "18:00".to_string(),
        mode: "online".to_string(),
        audience: "Everyone".to_string(),
        agenda: vec!["Talk".to_string()],
        organizer: "Org".to_string(),
        tags: vec!["web".to_string()],
    };
    services::create_event(repo, input).await.unwrap().id
}

fn booking(event_id: EventId, email: &str) -> NewBooking {
    NewBooking {
        event_id,
        email: email.to_string(),
    }
}

#[tokio::test]
async fn test_email_is_trimmed_and_lowercased() {
    let repo = LocalRepository::new();
    let event_id = seed_event(&repo, "Web Day").await;

    let created = services::create_booking(&repo, booking(event_id, "  Ada@Example.COM "))
        .await
        .unwrap();
    assert_eq!(created.email, "ada@example.com");
    assert_eq!(created.event_id, event_id);
}

#[tokio::test]
async fn test_malformed_email_is_rejected() {
    let repo = LocalRepository::new();
    let event_id = seed_event(&repo, "Web Day").await;

    for email in ["", "ada", "ada@example", "a da@example.com", "@example.com"] {
        let err = services::create_booking(&repo, booking(event_id, email))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("email"), "email {:?}", email);
    }
    assert_eq!(repo.booking_count(), 0);
}

#[tokio::test]
async fn test_unknown_event_is_reference_error_without_write() {
    let repo = LocalRepository::new();

    let err = services::create_booking(&repo, booking(EventId::new(404), "ada@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::ReferenceError { .. }));
    assert!(err.is_client_error());
    assert_eq!(err.to_string(), "Event does not exist");
    assert_eq!(repo.booking_count(), 0);
}

#[tokio::test]
async fn test_email_checked_before_event_reference() {
    let repo = LocalRepository::new();
    let err = services::create_booking(&repo, booking(EventId::new(404), "not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

#[tokio::test]
async fn test_count_bookings_for_event() {
    let repo = LocalRepository::new();
    let a = seed_event(&repo, "Event A").await;
    let b = seed_event(&repo, "Event B").await;

    for email in ["one@example.com", "two@example.com"] {
        services::create_booking(&repo, booking(a, email)).await.unwrap();
    }
    services::create_booking(&repo, booking(b, "three@example.com"))
        .await
        .unwrap();

    assert_eq!(services::count_bookings_for_event(&repo, a).await.unwrap(), 2);
    assert_eq!(services::count_bookings_for_event(&repo, b).await.unwrap(), 1);
    assert_eq!(
        services::count_bookings_for_event(&repo, EventId::new(999)).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_update_booking_moves_to_existing_event() {
    let repo = LocalRepository::new();
    let a = seed_event(&repo, "Event A").await;
    let b = seed_event(&repo, "Event B").await;
    let created = services::create_booking(&repo, booking(a, "ada@example.com"))
        .await
        .unwrap();

    let moved = services::update_booking(
        &repo,
        created.id,
        BookingUpdate {
            event_id: Some(b),
            email: Some("ADA@example.com".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(moved.event_id, b);
    assert_eq!(moved.email, "ada@example.com");
}

#[tokio::test]
async fn test_update_booking_to_missing_event_fails() {
    let repo = LocalRepository::new();
    let a = seed_event(&repo, "Event A").await;
    let created = services::create_booking(&repo, booking(a, "ada@example.com"))
        .await
        .unwrap();

    let err = services::update_booking(
        &repo,
        created.id,
        BookingUpdate {
            event_id: Some(EventId::new(77)),
            email: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepositoryError::ReferenceError { .. }));

    let unchanged = services::update_booking(&repo, created.id, BookingUpdate::default())
        .await
        .unwrap();
    assert_eq!(unchanged.event_id, a);
}
