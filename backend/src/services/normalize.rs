//! Canonical forms for date, time and email fields.
//!
//! These are pure functions; callers decide when a field changed and only
//! then run the matching normalizer.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::validation::FieldError;

static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]?[0-9]|2[0-3]):([0-5][0-9])$").expect("valid time regex"));

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Timestamp layouts without an offset; the date part is taken as written.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

/// Parse a calendar date and format it as `YYYY-MM-DD`.
///
/// Timestamps with an offset are converted to UTC first, so
/// `2024-03-01T23:30:00-02:00` becomes `2024-03-02`.
pub fn normalize_date(input: &str) -> Result<String, FieldError> {
    parse_calendar_date(input.trim())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| FieldError::new("date", "Invalid date format"))
}

/// Validate an `H:MM`/`HH:MM` 24-hour time and zero-pad it to `HH:MM`.
pub fn normalize_time(input: &str) -> Result<String, FieldError> {
    let caps = TIME_PATTERN
        .captures(input.trim())
        .ok_or_else(|| FieldError::new("time", "Time must be in HH:MM format"))?;
    Ok(format!("{:0>2}:{:0>2}", &caps[1], &caps[2]))
}

/// Trim and lowercase an email address and check its shape.
pub fn normalize_email(input: &str) -> Result<String, FieldError> {
    let email = input.trim().to_lowercase();
    if email.is_empty() {
        return Err(FieldError::new("email", "Email is required"));
    }
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(FieldError::new("email", "Please provide a valid email address"));
    }
    Ok(email)
}
