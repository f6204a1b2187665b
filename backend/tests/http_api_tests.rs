//! In-process HTTP tests against the full router with a local repository
//! and a temporary upload directory.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use devevent::config::AppConfig;
use devevent::db::repositories::LocalRepository;
use devevent::db::DatabaseConnection;
use devevent::http::{create_router, AppState};
use devevent::storage::LocalImageStore;

const BOUNDARY: &str = "devevent-test-boundary";

struct TestApp {
    router: Router,
    repo: Arc<LocalRepository>,
    uploads: TempDir,
}

fn test_app() -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let repo = Arc::new(LocalRepository::new());
    let database = Arc::new(DatabaseConnection::connected(repo.clone()));
    let config = AppConfig {
        upload_dir: uploads.path().to_path_buf(),
        ..Default::default()
    };
    let images = Arc::new(LocalImageStore::new(uploads.path(), &config.image_folder, ""));
    let router = create_router(AppState::new(database, images, config));
    TestApp {
        router,
        repo,
        uploads,
    }
}

fn event_fields(title: &str) -> Vec<(&'static str, String)> {
    vec![
        ("title", title.to_string()),
        ("description", "A day for builders".to_string()),
        ("overview", "Talks and hands-on labs".to_string()),
        ("venue", "Pier 48".to_string()),
        ("location", "San Francisco, CA".to_string()),
        ("date", "2025-11-07".to_string()),
        ("time", "9:00".to_string()),
        ("mode", "offline".to_string()),
        ("audience", "Engineers".to_string()),
        ("organizer", "DevEvent".to_string()),
        ("tags", r#"["cloud", "devops"]"#.to_string()),
        ("agenda", r#"["Keynote", "Labs"]"#.to_string()),
    ]
}

fn multipart_request(fields: &[(&str, String)], image: Option<&[u8]>) -> Request<Body> {
    multipart_request_with(fields, image.map(|bytes| ("banner.png", "image/png", bytes)))
}

fn multipart_request_with(
    fields: &[(&str, String)],
    image: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, filename, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/events")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create(app: &TestApp, title: &str) -> Value {
    let (status, body) = send_json(
        app,
        multipart_request(&event_fields(title), Some(b"\x89PNG fake image".as_slice())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    body["event"].clone()
}

#[tokio::test]
async fn test_list_events_empty() {
    let app = test_app();
    let (status, body) = send_json(&app, get("/api/events")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Events fetched successfully");
    assert_eq!(body["events"], serde_json::json!([]));
}

#[tokio::test]
async fn test_create_event_stores_image_and_normalizes() {
    let app = test_app();
    let event = create(&app, "Cloud Native Day").await;

    assert_eq!(event["slug"], "cloud-native-day");
    assert_eq!(event["time"], "09:00");
    assert_eq!(event["tags"], serde_json::json!(["cloud", "devops"]));
    assert_eq!(event["agenda"], serde_json::json!(["Keynote", "Labs"]));

    let image = event["image"].as_str().unwrap();
    assert!(image.starts_with("/uploads/DevEvent/"), "image {}", image);
    let file = image.rsplit('/').next().unwrap();
    assert!(app.uploads.path().join("DevEvent").join(file).exists());

    let (status, served) = send(&app, get(image)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, b"\x89PNG fake image");
}

#[tokio::test]
async fn test_create_event_duplicate_titles_get_suffixes() {
    let app = test_app();
    create(&app, "Cloud Native Day").await;
    let second = create(&app, "Cloud Native Day").await;
    assert_eq!(second["slug"], "cloud-native-day-1");
}

#[tokio::test]
async fn test_create_event_requires_image() {
    let app = test_app();

    let (status, body) = send_json(&app, multipart_request(&event_fields("No Image"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Image is required");

    let (status, _) = send_json(
        &app,
        multipart_request(&event_fields("Empty Image"), Some(b"".as_slice())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.repo.event_count(), 0);
}

#[tokio::test]
async fn test_create_event_rejects_svg_image() {
    let app = test_app();
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg"><script>alert(document.cookie)</script></svg>"#;

    let (status, body) = send_json(
        &app,
        multipart_request_with(
            &event_fields("Svg Banner"),
            Some(("banner.svg", "image/svg+xml", svg.as_slice())),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Event creation failed");
    assert_eq!(app.repo.event_count(), 0);

    let stored: Vec<_> = std::fs::read_dir(app.uploads.path())
        .unwrap()
        .flatten()
        .flat_map(|entry| std::fs::read_dir(entry.path()).into_iter().flatten().flatten())
        .collect();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_create_event_rejects_non_json_tags() {
    let app = test_app();
    let mut fields = event_fields("Bad Tags");
    fields.retain(|(name, _)| *name != "tags");
    fields.push(("tags", "cloud, devops".to_string()));

    let (status, body) = send_json(&app, multipart_request(&fields, Some(b"img".as_slice()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Tags must be a JSON array of strings");
    assert_eq!(app.repo.event_count(), 0);
}

#[tokio::test]
async fn test_create_event_validation_error_is_bad_request() {
    let app = test_app();
    let mut fields = event_fields("Bad Time");
    fields.retain(|(name, _)| *name != "time");
    fields.push(("time", "noon".to_string()));

    let (status, body) = send_json(&app, multipart_request(&fields, Some(b"img".as_slice()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Time must be in HH:MM format");
    assert_eq!(app.repo.event_count(), 0);
}

#[tokio::test]
async fn test_get_event_by_slug_is_canonicalized() {
    let app = test_app();
    create(&app, "Cloud Native Day").await;

    let (status, body) = send_json(&app, get("/api/events/Cloud-Native-DAY")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Event fetched successfully");
    assert_eq!(body["event"]["title"], "Cloud Native Day");
}

#[tokio::test]
async fn test_get_unknown_event_is_not_found() {
    let app = test_app();
    let (status, body) = send_json(&app, get("/api/events/missing-event")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found");
}

#[tokio::test]
async fn test_malformed_slugs_never_reach_storage() {
    let app = test_app();
    let before = app.repo.query_count();

    for (uri, message) in [
        ("/api/events/../etc", "Invalid slug format"),
        ("/api/events/a/b", "Invalid slug format"),
        ("/api/events/bad%20slug", "Invalid slug format"),
        ("/api/events/double--hyphen", "Invalid slug format"),
        ("/api/events/%20%20", "Slug is required"),
        ("/api/events/%FF", "Invalid slug encoding"),
        ("/api/events/%ZZ", "Invalid slug encoding"),
        ("/api/events/ai-summit%2", "Invalid slug encoding"),
    ] {
        let (status, body) = send_json(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(body["message"], message, "uri {}", uri);
    }

    assert_eq!(app.repo.query_count(), before);
}

#[tokio::test]
async fn test_create_booking() {
    let app = test_app();
    let event = create(&app, "Cloud Native Day").await;

    let (status, body) = send_json(
        &app,
        post_json(
            "/api/bookings",
            serde_json::json!({"eventId": event["id"], "email": " Grace@Example.com "}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["email"], "grace@example.com");
    assert_eq!(app.repo.booking_count(), 1);
}

#[tokio::test]
async fn test_booking_for_unknown_event_is_bad_request() {
    let app = test_app();
    let (status, body) = send_json(
        &app,
        post_json(
            "/api/bookings",
            serde_json::json!({"eventId": 12345, "email": "grace@example.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Event does not exist");
    assert_eq!(app.repo.booking_count(), 0);
}

#[tokio::test]
async fn test_booking_with_invalid_email_is_bad_request() {
    let app = test_app();
    let event = create(&app, "Cloud Native Day").await;
    let (status, body) = send_json(
        &app,
        post_json(
            "/api/bookings",
            serde_json::json!({"eventId": event["id"], "email": "grace"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide a valid email address");
}

#[tokio::test]
async fn test_health_reports_connection_state() {
    let app = test_app();
    let (status, body) = send_json(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_pages_render_events() {
    let app = test_app();
    create(&app, "Cloud Native Day").await;
    create(&app, "DevOps Summit").await;

    let (status, html) = send(&app, get("/")).await;
    let html = String::from_utf8(html).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("href=\"/events/cloud-native-day\""));
    assert!(html.contains("href=\"/events/devops-summit\""));

    let (status, html) = send(&app, get("/events/cloud-native-day")).await;
    let html = String::from_utf8(html).unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Be the first to book your spot!"));
    // Shares the "cloud" tag.
    assert!(html.contains("href=\"/events/devops-summit\""));

    let (status, _) = send(&app, get("/events/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_form_redirects_back() {
    let app = test_app();
    create(&app, "Cloud Native Day").await;

    let request = Request::builder()
        .method("POST")
        .uri("/events/cloud-native-day/bookings")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("email=ada%40example.com"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/events/cloud-native-day?booked=true"
    );
    assert_eq!(app.repo.booking_count(), 1);

    let (_, html) = send(&app, get("/events/cloud-native-day?booked=true")).await;
    let html = String::from_utf8(html).unwrap();
    assert!(html.contains("Join 1 people who have already booked their spot!"));
}
