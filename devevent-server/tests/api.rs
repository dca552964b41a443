//! JSON API tests against the in-memory store

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use devevent_server::{
    build_router, AppState, DisabledUploader, EventStore, EventsClient, ImageUploader,
    MemoryEventStore, ServerConfig,
};

use common::{event_at, event_fields, multipart, FakeUploader, UnavailableStore, UPLOADED_URL};

fn app_with(store: Arc<MemoryEventStore>, uploader: Arc<dyn ImageUploader>) -> Router {
    let state = AppState::new(
        store,
        uploader,
        EventsClient::new("http://127.0.0.1:9").unwrap(),
    );
    build_router(state, &ServerConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_event(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Request<Body> {
    let (content_type, body) = multipart(fields, image);
    Request::post("/api/events")
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

fn post_booking(body: Value) -> Request<Body> {
    Request::post("/api/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn create_without_image_is_rejected_before_any_write() {
    let store = Arc::new(MemoryEventStore::new());
    let uploader = Arc::new(FakeUploader::default());
    let app = app_with(store.clone(), uploader.clone());

    let (status, body) = send(app, post_event(&event_fields("Rust Summit"), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Image file is required");
    assert_eq!(body["status"], 400);
    assert_eq!(store.writes(), 0);
    assert_eq!(uploader.calls(), 0);
}

#[tokio::test]
async fn create_stores_event_with_uploaded_image_url() {
    let store = Arc::new(MemoryEventStore::new());
    let uploader = Arc::new(FakeUploader::default());
    let app = app_with(store.clone(), uploader.clone());

    let (status, body) = send(
        app,
        post_event(&event_fields("Rust Summit"), Some(("banner.png", b"\x89PNG"))),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Event Created Successfully");
    assert_eq!(body["status"], 201);

    let event = &body["event"];
    assert_eq!(event["image"], UPLOADED_URL);
    assert_eq!(event["slug"], "rust-summit");
    assert_eq!(event["date"], "2026-06-12");
    assert_eq!(event["time"], "09:30");
    assert_eq!(event["mode"], "hybrid");
    assert_eq!(event["tags"], json!(["rust", "systems"]));
    assert_eq!(event["agenda"], json!(["Keynote", "Workshops"]));

    assert_eq!(uploader.calls(), 1);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn malformed_tags_json_is_rejected() {
    let store = Arc::new(MemoryEventStore::new());
    let uploader = Arc::new(FakeUploader::default());
    let app = app_with(store.clone(), uploader.clone());

    let mut fields = event_fields("Rust Summit");
    for field in fields.iter_mut() {
        if field.0 == "tags" {
            field.1 = "rust, systems";
        }
    }

    let (status, body) = send(app, post_event(&fields, Some(("banner.png", b"png")))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid JSON data format");
    assert_eq!(uploader.calls(), 0);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn invalid_mode_fails_validation_without_upload() {
    let store = Arc::new(MemoryEventStore::new());
    let uploader = Arc::new(FakeUploader::default());
    let app = app_with(store.clone(), uploader.clone());

    let mut fields = event_fields("Rust Summit");
    for field in fields.iter_mut() {
        if field.0 == "mode" {
            field.1 = "in-person";
        }
    }

    let (status, body) = send(app, post_event(&fields, Some(("banner.png", b"png")))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("mode"));
    assert_eq!(uploader.calls(), 0);
}

#[tokio::test]
async fn duplicate_title_conflicts() {
    let store = Arc::new(MemoryEventStore::new());
    store
        .seed(event_at("Rust Summit", &["rust"], Utc::now()))
        .await
        .unwrap();
    let app = app_with(store.clone(), Arc::new(FakeUploader::default()));

    let (status, body) = send(
        app,
        post_event(&event_fields("Rust  Summit!"), Some(("banner.png", b"png"))),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn upload_failure_is_reported_as_creation_failure() {
    let store = Arc::new(MemoryEventStore::new());
    let app = app_with(store.clone(), Arc::new(DisabledUploader));

    let (status, body) = send(
        app,
        post_event(&event_fields("Rust Summit"), Some(("banner.png", b"png"))),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Event Creation Failed");
    assert!(body["error"].as_str().unwrap().contains("not configured"));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn list_is_newest_first() {
    let store = Arc::new(MemoryEventStore::new());
    let now = Utc::now();
    for (title, age_hours) in [("Oldest", 48), ("Newest", 1), ("Middle", 24)] {
        store
            .seed(event_at(title, &["rust"], now - Duration::hours(age_hours)))
            .await
            .unwrap();
    }
    let app = app_with(store, Arc::new(FakeUploader::default()));

    let (status, body) = send(app, Request::get("/api/events").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Events Fetched Successfully");
    let titles: Vec<&str> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
}

#[tokio::test]
async fn event_detail_and_similar() {
    let store = Arc::new(MemoryEventStore::new());
    let now = Utc::now();
    store.seed(event_at("Rust Summit", &["rust"], now)).await.unwrap();
    store.seed(event_at("Rust Meetup", &["rust", "meetup"], now)).await.unwrap();
    store.seed(event_at("Design Day", &["design"], now)).await.unwrap();
    let app = app_with(store, Arc::new(FakeUploader::default()));

    let (status, body) = send(
        app.clone(),
        Request::get("/api/events/rust-summit").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["title"], "Rust Summit");
    assert_eq!(body["bookings"], 0);

    let (status, body) = send(
        app.clone(),
        Request::get("/api/events/rust-summit/similar").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let slugs: Vec<&str> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["rust-meetup"]);

    let (status, _) = send(
        app,
        Request::get("/api/events/ghost").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_similar_limit_gets_json_envelope() {
    let store = Arc::new(MemoryEventStore::new());
    store.seed(event_at("Rust Summit", &["rust"], Utc::now())).await.unwrap();
    let app = app_with(store, Arc::new(FakeUploader::default()));

    let (status, body) = send(
        app,
        Request::get("/api/events/rust-summit/similar?limit=abc")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["message"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn store_failure_on_listing_is_reported() {
    let state = AppState::new(
        Arc::new(UnavailableStore),
        Arc::new(DisabledUploader),
        EventsClient::new("http://127.0.0.1:9").unwrap(),
    );
    let app = build_router(state, &ServerConfig::default());

    let (status, body) = send(app, Request::get("/api/events").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Events Fetching Failed");
    assert_eq!(body["status"], 500);
    assert!(body["error"]
        .as_str()
        .is_some_and(|e| e.contains("database unavailable")));
}

#[tokio::test]
async fn bookings_are_idempotent_per_email() {
    let store = Arc::new(MemoryEventStore::new());
    let event = store
        .seed(event_at("Rust Summit", &["rust"], Utc::now()))
        .await
        .unwrap();
    let app = app_with(store.clone(), Arc::new(FakeUploader::default()));

    let (status, first) = send(
        app.clone(),
        post_booking(json!({ "slug": "rust-summit", "email": "Ada@Example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["booking"]["email"], "ada@example.com");

    let (status, again) = send(
        app.clone(),
        post_booking(json!({ "slug": "rust-summit", "email": " ada@example.com " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["booking"]["id"], first["booking"]["id"]);

    assert_eq!(store.count_bookings(event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn booking_rejections() {
    let store = Arc::new(MemoryEventStore::new());
    store
        .seed(event_at("Rust Summit", &["rust"], Utc::now()))
        .await
        .unwrap();
    let app = app_with(store, Arc::new(FakeUploader::default()));

    let (status, _) = send(
        app.clone(),
        post_booking(json!({ "slug": "rust-summit", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app.clone(),
        post_booking(json!({ "slug": "ghost", "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(app, post_booking(json!({ "email": "ada@example.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}
