//! Pure write-path helpers shared by every repository backend.
//!
//! Nothing here touches storage except [`slug::resolve_unique_slug`], which
//! only reads through the [`crate::db::repository::EventRepository`] trait.

pub mod normalize;
pub mod slug;
pub mod validation;

pub use normalize::{normalize_date, normalize_email, normalize_time};
pub use slug::{derive_base_slug, normalize_slug_param, resolve_unique_slug, SlugParamError};
pub use validation::{validate_event_fields, FieldError};
