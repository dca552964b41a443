#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use devevent_core::{Booking, BookingEmail, CacheState, Event, EventDraft, NewEvent};
use devevent_server::db::DbError;
use devevent_server::{EventStore, ImageUploader, UploadError};

/// Uploader that records calls and hands back a fixed URL
#[derive(Default)]
pub struct FakeUploader {
    calls: AtomicUsize,
}

pub const UPLOADED_URL: &str = "https://res.cloudinary.com/demo/image/upload/DevEvent/banner.png";

impl FakeUploader {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageUploader for FakeUploader {
    async fn upload(&self, bytes: Vec<u8>, _filename: String) -> Result<String, UploadError> {
        assert!(!bytes.is_empty());
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(UPLOADED_URL.to_string())
    }
}

/// Store whose database never comes up
pub struct UnavailableStore;

fn unavailable() -> DbError {
    DbError::Connection(Arc::new(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl EventStore for UnavailableStore {
    async fn create_event(&self, _event: NewEvent, _image_url: String) -> Result<Event, DbError> {
        Err(unavailable())
    }

    async fn list_events(&self) -> Result<Vec<Event>, DbError> {
        Err(unavailable())
    }

    async fn find_event_by_slug(&self, _slug: &str) -> Result<Event, DbError> {
        Err(unavailable())
    }

    async fn find_similar_events(&self, _slug: &str, _limit: usize) -> Result<Vec<Event>, DbError> {
        Err(unavailable())
    }

    async fn create_booking(
        &self,
        _slug: &str,
        _email: BookingEmail,
    ) -> Result<(Booking, bool), DbError> {
        Err(unavailable())
    }

    async fn count_bookings(&self, _event_id: Uuid) -> Result<i64, DbError> {
        Err(unavailable())
    }

    fn connection_state(&self) -> CacheState {
        CacheState::Idle
    }
}

pub fn draft(title: &str, tags: &[&str]) -> EventDraft {
    EventDraft {
        title: title.into(),
        description: format!("{title} description"),
        overview: "A day of talks".into(),
        date: "2026-06-12".into(),
        time: "09:30".into(),
        location: "Lisbon".into(),
        mode: "offline".into(),
        audience: "Developers".into(),
        organizer: "DevEvent".into(),
        agenda: vec!["Keynote".into(), "Workshops".into()],
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn event_at(title: &str, tags: &[&str], created_at: DateTime<Utc>) -> Event {
    Event::from_new(
        draft(title, tags).validate().expect("valid draft"),
        "https://img.example/banner.png".into(),
        created_at,
    )
}

pub const BOUNDARY: &str = "devevent-test-boundary";

/// Build a multipart/form-data body by hand.
pub fn multipart(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Text fields for a valid event form
pub fn event_fields(title: &str) -> Vec<(&str, &str)> {
    vec![
        ("title", title),
        ("description", "Two days of Rust"),
        ("overview", "Talks, workshops and hallway track"),
        ("date", "June 12, 2026"),
        ("time", "9:30 AM"),
        ("location", "Lisbon"),
        ("mode", "hybrid"),
        ("audience", "Developers"),
        ("organizer", "DevEvent"),
        ("tags", r#"["rust","systems"]"#),
        ("agenda", r#"["Keynote","Workshops"]"#),
    ]
}
