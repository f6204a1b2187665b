//! HTTP server: JSON API, HTML pages and uploaded files.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers + pages)                       │
//! │  - multipart / JSON parsing, slug checks                  │
//! │  - CORS, compression, tracing, error bodies               │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (db::services)                             │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  DatabaseConnection → LocalRepository / Postgres          │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
