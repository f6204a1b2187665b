//! # DevEvent backend
//!
//! Event listing service: create events with an uploaded image, list them,
//! look them up by slug, find similar events by shared tags and book a spot
//! by email.
//!
//! ## Architecture
//!
//! - [`models`]: events, bookings and their write records
//! - [`services`]: slug derivation, field validation and normalization
//! - [`db`]: repository traits, local and Postgres backends, the shared
//!   connection and the high-level operations in [`db::services`]
//! - [`storage`]: image upload backends
//! - [`config`]: server settings from the environment
//! - [`http`]: axum JSON API and HTML pages

// RepositoryError carries structured context.
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod storage;

#[cfg(feature = "http-server")]
pub mod http;
