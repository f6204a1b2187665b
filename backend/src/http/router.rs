//! Router configuration.
//!
//! Sets up the JSON API, the HTML pages, the upload file server and the
//! middleware stack (body limit, compression, tracing, CORS).

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use super::pages;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The slug is captured as a wildcard so that values containing `/` are
    // rejected by the slug check instead of falling through to a 404.
    let api = Router::new()
        .route(
            "/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/events/{*slug}", get(handlers::get_event_by_slug))
        .route("/bookings", post(handlers::create_booking));

    let uploads = ServeDir::new(&state.config.upload_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(pages::home))
        .route("/events/{slug}", get(pages::event_page))
        .route("/events/{slug}/bookings", post(pages::book_event))
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
