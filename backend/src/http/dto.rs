//! Response bodies for the JSON API.

use serde::{Deserialize, Serialize};

use crate::models::{Booking, Event};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventListResponse {
    pub message: String,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub message: String,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub message: String,
    pub booking: Booking,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Connection state of the shared database handle.
    pub database: String,
}
