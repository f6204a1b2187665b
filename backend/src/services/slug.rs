//! Slug derivation and collision resolution.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::repository::{EventRepository, RepositoryResult};
use crate::models::EventId;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Derive the base slug for a title.
///
/// The title is lowercased and trimmed; ASCII letters and digits are kept,
/// runs of whitespace, hyphens and underscores become a single hyphen, and
/// every other character is dropped. The result never starts or ends with a
/// hyphen. An empty string means the title has nothing usable.
pub fn derive_base_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut separator = false;

    for c in lowered.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if separator && !slug.is_empty() {
                slug.push('-');
            }
            separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            separator = true;
        }
    }

    slug
}

/// Return `base`, or the first of `base-1`, `base-2`, … not used by any
/// event other than `exclude`.
///
/// Each candidate is checked against the store in turn. Two writers can
/// still pick the same candidate concurrently; the store's uniqueness
/// constraint rejects the second insert.
pub async fn resolve_unique_slug<R: EventRepository + ?Sized>(
    repo: &R,
    base: &str,
    exclude: Option<EventId>,
) -> RepositoryResult<String> {
    if !repo.slug_exists(base, exclude).await? {
        return Ok(base.to_string());
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !repo.slug_exists(&candidate, exclude).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Why a slug taken from a URL was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SlugParamError {
    #[error("Slug is required")]
    Missing,
    #[error("Invalid slug format")]
    InvalidFormat,
    #[error("Invalid slug encoding")]
    InvalidEncoding,
}

/// Canonicalize a decoded slug from a request path.
///
/// The value is trimmed and lowercased and must then consist of
/// lowercase alphanumeric groups joined by single hyphens. Anything else,
/// including path separators and dots, is rejected before it can reach a
/// query. A `%` left in the decoded value is an escape the router could
/// not decode (`%ZZ`, a lone `%`) and is reported as an encoding error.
pub fn normalize_slug_param(decoded: &str) -> Result<String, SlugParamError> {
    if decoded.contains('%') {
        return Err(SlugParamError::InvalidEncoding);
    }
    let slug = decoded.trim().to_lowercase();
    if slug.is_empty() {
        return Err(SlugParamError::Missing);
    }
    if !SLUG_PATTERN.is_match(&slug) {
        return Err(SlugParamError::InvalidFormat);
    }
    Ok(slug)
}
