//! Server-rendered HTML pages.
//!
//! The home page lists every event; the detail page shows one event with
//! its booking count, a booking form and similar events. Both read through
//! [`crate::db::services`] like the JSON handlers do.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::fmt::Write;
use tracing::{error, warn};

use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{Event, EventSummary, NewBooking};
use crate::services::normalize_slug_param;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} | DevEvent</title>\n</head>\n<body>\n\
         <header><a href=\"/\">DevEvent</a></header>\n<main>\n{}</main>\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

fn page(status: StatusCode, title: &str, body: &str) -> Response {
    (status, Html(layout(title, body))).into_response()
}

fn not_found_page() -> Response {
    page(
        StatusCode::NOT_FOUND,
        "Not found",
        "<h1>Event not found</h1>\n<p><a href=\"/\">Back to all events</a></p>\n",
    )
}

fn error_page() -> Response {
    page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error",
        "<h1>Something went wrong</h1>\n<p>Please try again later.</p>\n",
    )
}

/// Card linking to an event. Events without a slug render nothing.
fn event_card(summary: &EventSummary) -> String {
    if summary.slug.is_empty() {
        return String::new();
    }
    let poster = if summary.image.trim().is_empty() {
        String::new()
    } else {
        format!(
            "<img class=\"poster\" src=\"{}\" alt=\"{}\" width=\"410\" height=\"300\">\n",
            escape_html(&summary.image),
            escape_html(&summary.title)
        )
    };
    format!(
        "<a class=\"event-card\" href=\"/events/{slug}\">\n{poster}\
         <p class=\"location\">{location}</p>\n<p class=\"title\">{title}</p>\n\
         <p class=\"datetime\"><span>{date}</span> <span>{time}</span></p>\n</a>\n",
        slug = escape_html(&summary.slug),
        title = escape_html(&summary.title),
        location = escape_html(&summary.location),
        date = escape_html(&summary.date),
        time = escape_html(&summary.time),
    )
}

fn list_items(items: &[String]) -> String {
    items.iter().fold(String::new(), |mut out, item| {
        let _ = writeln!(out, "<li>{}</li>", escape_html(item));
        out
    })
}

pub(crate) fn render_home(events: &[Event]) -> String {
    let mut body = String::from("<h1>The Hub for Every Dev Event You Can't Miss</h1>\n");
    body.push_str("<section id=\"events\">\n<h2>Featured Events</h2>\n<div class=\"events\">\n");
    for event in events {
        body.push_str(&event_card(&event.summary()));
    }
    body.push_str("</div>\n</section>\n");
    layout("Events", &body)
}

fn booking_blurb(bookings: u64) -> String {
    if bookings > 0 {
        format!("Join {} people who have already booked their spot!", bookings)
    } else {
        "Be the first to book your spot!".to_string()
    }
}

pub(crate) fn render_event(
    event: &Event,
    bookings: u64,
    similar: &[EventSummary],
    booked: bool,
) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<section id=\"event\">\n<div class=\"header\">\n<h1>{title}</h1>\n<p>{description}</p>\n</div>\n\
         <div class=\"details\">\n<div class=\"content\">\n\
         <img class=\"banner\" src=\"{image}\" alt=\"Event Banner\" width=\"800\" height=\"800\">\n\
         <section><h2>Overview</h2><p>{overview}</p></section>\n\
         <section><h2>Event details</h2>\n<ul class=\"event-details\">\n\
         <li>{date}</li>\n<li>{time}</li>\n<li>{venue}, {location}</li>\n<li>{mode}</li>\n<li>{audience}</li>\n\
         </ul></section>\n",
        title = escape_html(&event.title),
        description = escape_html(&event.description),
        image = escape_html(&event.image),
        overview = escape_html(&event.overview),
        date = escape_html(&event.date),
        time = escape_html(&event.time),
        venue = escape_html(&event.venue),
        location = escape_html(&event.location),
        mode = escape_html(&event.mode),
        audience = escape_html(&event.audience),
    );

    if !event.agenda.is_empty() {
        let _ = write!(
            body,
            "<section class=\"agenda\"><h2>Agenda</h2>\n<ul>\n{}</ul></section>\n",
            list_items(&event.agenda)
        );
    }
    let _ = write!(
        body,
        "<section><h2>About the Organizer</h2><p>{}</p></section>\n",
        escape_html(&event.organizer)
    );
    if !event.tags.is_empty() {
        body.push_str("<div class=\"tags\">\n");
        for tag in &event.tags {
            let _ = writeln!(body, "<span class=\"pill\">{}</span>", escape_html(tag));
        }
        body.push_str("</div>\n");
    }
    body.push_str("</div>\n");

    let _ = write!(
        body,
        "<aside class=\"booking\">\n<h2>Book your spot</h2>\n<p>{blurb}</p>\n{notice}\
         <form method=\"post\" action=\"/events/{slug}/bookings\">\n\
         <label for=\"email\">Email Address</label>\n\
         <input type=\"email\" id=\"email\" name=\"email\" required>\n\
         <button type=\"submit\">Submit</button>\n</form>\n</aside>\n</div>\n",
        blurb = booking_blurb(bookings),
        notice = if booked {
            "<p class=\"notice\">Thank you for signing up!</p>\n"
        } else {
            ""
        },
        slug = escape_html(&event.slug),
    );

    body.push_str("<div class=\"similar\">\n<h2>Similar Events</h2>\n<div class=\"events\">\n");
    for summary in similar {
        body.push_str(&event_card(summary));
    }
    body.push_str("</div>\n</div>\n</section>\n");

    layout(&event.title, &body)
}

/// GET /
pub async fn home(State(state): State<AppState>) -> Response {
    let events = match state.repository().await {
        Ok(repo) => db_services::list_events(repo.as_ref()).await,
        Err(e) => Err(e),
    };
    match events {
        Ok(events) => Html(render_home(&events)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load events for home page");
            error_page()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventPageQuery {
    #[serde(default)]
    pub booked: bool,
}

/// GET /events/{slug}
///
/// Similar events and the booking count are best effort: failures are
/// logged and the page renders without them.
pub async fn event_page(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Query(query): Query<EventPageQuery>,
) -> Response {
    let Ok(slug) = normalize_slug_param(&raw) else {
        return not_found_page();
    };
    let repo = match state.repository().await {
        Ok(repo) => repo,
        Err(e) => {
            error!(error = %e, "Database unavailable");
            return error_page();
        }
    };

    let event = match db_services::find_event_by_slug(repo.as_ref(), &slug).await {
        Ok(Some(event)) => event,
        Ok(None) => return not_found_page(),
        Err(e) => {
            error!(%slug, error = %e, "Failed to load event");
            return error_page();
        }
    };

    let similar = db_services::find_similar_events_by_slug(repo.as_ref(), &slug)
        .await
        .unwrap_or_else(|e| {
            warn!(%slug, error = %e, "Failed to load similar events");
            Vec::new()
        });
    let bookings = db_services::count_bookings_for_event(repo.as_ref(), event.id)
        .await
        .unwrap_or_else(|e| {
            warn!(%slug, error = %e, "Failed to count bookings");
            0
        });
    Html(render_event(&event, bookings, &similar, query.booked)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct BookingForm {
    pub email: String,
}

/// POST /events/{slug}/bookings
///
/// Form fallback for the booking widget; redirects back to the event page.
pub async fn book_event(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Form(form): Form<BookingForm>,
) -> Response {
    let Ok(slug) = normalize_slug_param(&raw) else {
        return not_found_page();
    };
    let repo = match state.repository().await {
        Ok(repo) => repo,
        Err(e) => {
            error!(error = %e, "Database unavailable");
            return error_page();
        }
    };
    let event = match db_services::find_event_by_slug(repo.as_ref(), &slug).await {
        Ok(Some(event)) => event,
        Ok(None) => return not_found_page(),
        Err(e) => {
            error!(%slug, error = %e, "Failed to load event");
            return error_page();
        }
    };

    let input = NewBooking {
        event_id: event.id,
        email: form.email,
    };
    match db_services::create_booking(repo.as_ref(), input).await {
        Ok(_) => Redirect::to(&format!("/events/{}?booked=true", slug)).into_response(),
        Err(e) if e.is_client_error() => page(
            StatusCode::BAD_REQUEST,
            "Booking failed",
            &format!(
                "<h1>Booking failed</h1>\n<p>{}</p>\n<p><a href=\"/events/{}\">Back to the event</a></p>\n",
                escape_html(&e.to_string()),
                escape_html(&slug)
            ),
        ),
        Err(e) => {
            error!(%slug, error = %e, "Failed to create booking");
            error_page()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::EventId;

    fn event(slug: &str) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(1),
            title: "Rust <Conf>".to_string(),
            slug: slug.to_string(),
            description: "Talks & workshops".to_string(),
            overview: "Overview".to_string(),
            image: "/uploads/DevEvent/a.png".to_string(),
            venue: "Hall".to_string(),
            location: "Berlin".to_string(),
            date: "2024-03-01".to_string(),
            time: "09:30".to_string(),
            mode: "offline".to_string(),
            audience: "Developers".to_string(),
            agenda: vec!["Keynote".to_string()],
            organizer: "DevEvent".to_string(),
            tags: vec!["rust".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_event_page_escapes_fields() {
        let html = render_event(&event("rust-conf"), 0, &[], false);
        assert!(html.contains("Rust &lt;Conf&gt;"));
        assert!(html.contains("Talks &amp; workshops"));
        assert!(html.contains("Be the first to book your spot!"));
        assert!(!html.contains("<Conf>"));
    }

    #[test]
    fn test_booking_blurb_counts() {
        let html = render_event(&event("rust-conf"), 3, &[], true);
        assert!(html.contains("Join 3 people who have already booked their spot!"));
        assert!(html.contains("Thank you for signing up!"));
    }

    #[test]
    fn test_card_without_slug_is_skipped() {
        let mut summary = event("").summary();
        assert_eq!(event_card(&summary), "");
        summary.slug = "rust-conf".to_string();
        summary.image = String::new();
        let card = event_card(&summary);
        assert!(card.contains("/events/rust-conf"));
        assert!(!card.contains("<img"));
    }
}
