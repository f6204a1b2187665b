use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id_type;

define_id_type!(EventId);

/// A stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,
    /// Start time, zero-padded `HH:MM`.
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Writable fields of this event, as last persisted.
    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            overview: self.overview.clone(),
            image: self.image.clone(),
            venue: self.venue.clone(),
            location: self.location.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            mode: self.mode.clone(),
            audience: self.audience.clone(),
            agenda: self.agenda.clone(),
            organizer: self.organizer.clone(),
            tags: self.tags.clone(),
        }
    }

    pub fn summary(&self) -> EventSummary {
        EventSummary {
            title: self.title.clone(),
            image: self.image.clone(),
            slug: self.slug.clone(),
            location: self.location.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
        }
    }

    /// True when this event has at least one tag in common with `tags`.
    pub fn shares_tag_with(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

/// Reduced projection used for "similar events" listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub title: String,
    pub image: String,
    pub slug: String,
    pub location: String,
    pub date: String,
    pub time: String,
}

/// Caller-supplied fields for a new event.
///
/// Values are taken as submitted; trimming, slug derivation and date/time
/// normalization happen in [`crate::db::services::create_event`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEvent {
    pub title: String,
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

/// Partial update of an existing event. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub image: Option<String>,
    pub venue: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub mode: Option<String>,
    pub audience: Option<String>,
    pub agenda: Option<Vec<String>>,
    pub organizer: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Validated, normalized event fields as handed to a repository for writing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRecord {
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

impl From<NewEvent> for EventRecord {
    fn from(input: NewEvent) -> Self {
        Self {
            title: input.title,
            slug: String::new(),
            description: input.description,
            overview: input.overview,
            image: input.image,
            venue: input.venue,
            location: input.location,
            date: input.date,
            time: input.time,
            mode: input.mode,
            audience: input.audience,
            agenda: input.agenda,
            organizer: input.organizer,
            tags: input.tags,
        }
    }
}

impl EventRecord {
    /// Overlay the fields present in `update`.
    pub fn apply(&mut self, update: EventUpdate) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }

        set(&mut self.title, update.title);
        set(&mut self.description, update.description);
        set(&mut self.overview, update.overview);
        set(&mut self.image, update.image);
        set(&mut self.venue, update.venue);
        set(&mut self.location, update.location);
        set(&mut self.date, update.date);
        set(&mut self.time, update.time);
        set(&mut self.mode, update.mode);
        set(&mut self.audience, update.audience);
        set(&mut self.agenda, update.agenda);
        set(&mut self.organizer, update.organizer);
        set(&mut self.tags, update.tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_roundtrip() {
        let id = EventId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }

    #[test]
    fn test_apply_overlays_only_present_fields() {
        let mut record = EventRecord {
            title: "Rust Meetup".to_string(),
            date: "2024-03-01".to_string(),
            tags: vec!["rust".to_string()],
            ..Default::default()
        };

        record.apply(EventUpdate {
            date: Some("2024-04-01".to_string()),
            tags: Some(vec!["rust".to_string(), "systems".to_string()]),
            ..Default::default()
        });

        assert_eq!(record.title, "Rust Meetup");
        assert_eq!(record.date, "2024-04-01");
        assert_eq!(record.tags.len(), 2);
    }

    #[test]
    fn test_new_event_deserializes_camel_case_with_defaults() {
        let input: NewEvent = serde_json::from_str(
            r#"{"title": "Launch", "tags": ["web"], "agenda": ["Intro"]}"#,
        )
        .unwrap();
        assert_eq!(input.title, "Launch");
        assert_eq!(input.tags, vec!["web"]);
        assert!(input.description.is_empty());
    }
}
