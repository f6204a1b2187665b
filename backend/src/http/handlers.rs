//! HTTP handlers for the JSON API.
//!
//! Each handler corresponds to an API endpoint and delegates to
//! [`crate::db::services`] for business logic.

use axum::{
    extract::{
        multipart::Field,
        rejection::{JsonRejection, PathRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};

use super::dto::{BookingResponse, EventListResponse, EventResponse, HealthResponse};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{NewBooking, NewEvent};
use crate::services::{normalize_slug_param, SlugParamError};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = match state.repository().await {
        Ok(repo) => db_services::health_check(repo.as_ref()).await.unwrap_or(false),
        Err(_) => false,
    };

    Json(HealthResponse {
        status: if reachable { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: state.database.state().to_string(),
    })
}

// =============================================================================
// Events
// =============================================================================

/// GET /api/events
///
/// All events, newest first.
pub async fn list_events(State(state): State<AppState>) -> HandlerResult<EventListResponse> {
    const FAILED: &str = "Events fetching failed";
    let repo = state
        .repository()
        .await
        .map_err(|e| AppError::repository(FAILED, e))?;
    let events = db_services::list_events(repo.as_ref())
        .await
        .map_err(|e| AppError::repository(FAILED, e))?;

    Ok(Json(EventListResponse {
        message: "Events fetched successfully".to_string(),
        events,
    }))
}

/// GET /api/events/{slug}
///
/// The slug is canonicalized and checked before any storage access.
pub async fn get_event_by_slug(
    State(state): State<AppState>,
    slug: Result<Path<String>, PathRejection>,
) -> HandlerResult<EventResponse> {
    const FAILED: &str = "Failed to fetch event";
    let Path(raw) =
        slug.map_err(|_| AppError::bad_request(SlugParamError::InvalidEncoding.to_string()))?;
    let slug = normalize_slug_param(&raw).map_err(|e| AppError::bad_request(e.to_string()))?;

    let repo = state
        .repository()
        .await
        .map_err(|e| AppError::repository(FAILED, e))?;
    let event = db_services::find_event_by_slug(repo.as_ref(), &slug)
        .await
        .map_err(|e| AppError::repository(FAILED, e))?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(Json(EventResponse {
        message: "Event fetched successfully".to_string(),
        event,
    }))
}

struct UploadedImage {
    bytes: Vec<u8>,
    filename: Option<String>,
    content_type: Option<String>,
}

fn form_error(e: impl std::fmt::Display) -> AppError {
    AppError::bad_request(format!("Invalid form data: {}", e))
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(form_error)
}

/// Parse a multipart field holding a JSON array of strings.
fn parse_string_list(label: &str, raw: &str) -> Result<Vec<String>, AppError> {
    serde_json::from_str::<Vec<String>>(raw)
        .map_err(|_| AppError::bad_request(format!("{} must be a JSON array of strings", label)))
}

async fn read_event_form(
    multipart: &mut Multipart,
) -> Result<(NewEvent, Option<UploadedImage>), AppError> {
    let mut input = NewEvent::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(form_error)?;
                image = Some(UploadedImage {
                    bytes: bytes.to_vec(),
                    filename,
                    content_type,
                });
            }
            "tags" => input.tags = parse_string_list("Tags", &field_text(field).await?)?,
            "agenda" => input.agenda = parse_string_list("Agenda", &field_text(field).await?)?,
            "title" => input.title = field_text(field).await?,
            "description" => input.description = field_text(field).await?,
            "overview" => input.overview = field_text(field).await?,
            "venue" => input.venue = field_text(field).await?,
            "location" => input.location = field_text(field).await?,
            "date" => input.date = field_text(field).await?,
            "time" => input.time = field_text(field).await?,
            "mode" => input.mode = field_text(field).await?,
            "audience" => input.audience = field_text(field).await?,
            "organizer" => input.organizer = field_text(field).await?,
            // Slugs are always derived; unknown fields are ignored.
            _ => {}
        }
    }

    Ok((input, image))
}

/// POST /api/events
///
/// Multipart form with the event fields, `tags` and `agenda` as JSON arrays,
/// and an `image` file. The image is uploaded first and its URL stored on
/// the event.
pub async fn create_event(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    const FAILED: &str = "Event creation failed";
    let (mut input, image) = read_event_form(&mut multipart).await?;
    let image = image
        .filter(|image| !image.bytes.is_empty())
        .ok_or_else(|| AppError::bad_request("Image is required"))?;

    input.image = state
        .images
        .upload(
            image.bytes,
            image.filename.as_deref(),
            image.content_type.as_deref(),
        )
        .await
        .map_err(|e| AppError::storage(FAILED, e))?;

    let repo = state
        .repository()
        .await
        .map_err(|e| AppError::repository(FAILED, e))?;
    let event = db_services::create_event(repo.as_ref(), input)
        .await
        .map_err(|e| AppError::repository(FAILED, e))?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            message: "Event created successfully".to_string(),
            event,
        }),
    ))
}

// =============================================================================
// Bookings
// =============================================================================

/// POST /api/bookings
///
/// JSON body `{eventId, email}`.
pub async fn create_booking(
    State(state): State<AppState>,
    body: Result<Json<NewBooking>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    const FAILED: &str = "Booking creation failed";
    let Json(input) = body.map_err(|e| AppError::bad_request(e.body_text()))?;

    let repo = state
        .repository()
        .await
        .map_err(|e| AppError::repository(FAILED, e))?;
    let booking = db_services::create_booking(repo.as_ref(), input)
        .await
        .map_err(|e| AppError::repository(FAILED, e))?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            message: "Booking created successfully".to_string(),
            booking,
        }),
    ))
}
