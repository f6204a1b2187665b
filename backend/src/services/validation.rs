//! Required-field validation for event writes.

use crate::db::repository::RepositoryError;
use crate::models::EventRecord;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl From<FieldError> for RepositoryError {
    fn from(err: FieldError) -> Self {
        RepositoryError::validation(err.field, err.message)
    }
}

fn require_text(value: &mut String, field: &'static str, label: &str) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
    if value.is_empty() {
        return Err(FieldError::new(field, format!("{} is required", label)));
    }
    Ok(())
}

fn require_items(items: &mut [String], field: &'static str, label: &str) -> Result<(), FieldError> {
    for item in items.iter_mut() {
        let trimmed = item.trim();
        if trimmed.len() != item.len() {
            *item = trimmed.to_string();
        }
    }
    if items.is_empty() || items.iter().any(|item| item.is_empty()) {
        return Err(FieldError::new(
            field,
            format!("{} must contain at least one non-empty item", label),
        ));
    }
    Ok(())
}

/// Trim every field of `record` in place and check that all required fields
/// are present.
///
/// Fields are checked in declaration order and the first failure is
/// returned. The slug is not checked here; it is derived afterwards.
pub fn validate_event_fields(record: &mut EventRecord) -> Result<(), FieldError> {
    require_text(&mut record.title, "title", "Title")?;
    require_text(&mut record.description, "description", "Description")?;
    require_text(&mut record.overview, "overview", "Overview")?;
    require_text(&mut record.image, "image", "Image URL")?;
    require_text(&mut record.venue, "venue", "Venue")?;
    require_text(&mut record.location, "location", "Location")?;
    require_text(&mut record.date, "date", "Date")?;
    require_text(&mut record.time, "time", "Time")?;
    require_text(&mut record.mode, "mode", "Mode")?;
    require_text(&mut record.audience, "audience", "Audience")?;
    require_items(&mut record.agenda, "agenda", "Agenda")?;
    require_text(&mut record.organizer, "organizer", "Organizer")?;
    require_items(&mut record.tags, "tags", "Tags")?;
    Ok(())
}
