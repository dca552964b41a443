//! In-memory event store
//!
//! Same contract as the Postgres store. Counts writes so tests can assert
//! that rejected requests never touched storage.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use devevent_core::{Booking, BookingEmail, Event, NewEvent};

use super::EventStore;
use crate::db::DbError;

#[derive(Default)]
struct State {
    /// Insertion order
    events: Vec<Event>,
    bookings: Vec<Booking>,
}

#[derive(Default)]
pub struct MemoryEventStore {
    state: RwLock<State>,
    writes: AtomicUsize,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built event as-is (keeps its timestamps).
    pub async fn seed(&self, event: Event) -> Result<Event, DbError> {
        let mut state = self.state.write().await;
        if state.events.iter().any(|e| e.slug == event.slug) {
            return Err(DbError::Conflict {
                resource: "event",
                id: event.slug,
            });
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        state.events.push(event.clone());
        Ok(event)
    }

    /// Number of successful writes (events + new bookings).
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn newest_first(events: &[Event]) -> Vec<Event> {
        // Reverse first so the stable sort keeps later inserts ahead on ties.
        let mut sorted: Vec<Event> = events.iter().rev().cloned().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn create_event(&self, event: NewEvent, image_url: String) -> Result<Event, DbError> {
        self.seed(Event::from_new(event, image_url, Utc::now())).await
    }

    async fn list_events(&self) -> Result<Vec<Event>, DbError> {
        let state = self.state.read().await;
        Ok(Self::newest_first(&state.events))
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Event, DbError> {
        let state = self.state.read().await;
        state
            .events
            .iter()
            .find(|e| e.slug == slug)
            .cloned()
            .ok_or_else(|| DbError::not_found("event", slug))
    }

    async fn find_similar_events(&self, slug: &str, limit: usize) -> Result<Vec<Event>, DbError> {
        let source = self.find_event_by_slug(slug).await?;
        let state = self.state.read().await;

        let mut similar = Self::newest_first(&state.events);
        similar.retain(|e| e.id != source.id && e.shares_tag_with(&source));
        similar.truncate(limit);
        Ok(similar)
    }

    async fn create_booking(
        &self,
        slug: &str,
        email: BookingEmail,
    ) -> Result<(Booking, bool), DbError> {
        let event = self.find_event_by_slug(slug).await?;
        let mut state = self.state.write().await;

        if let Some(existing) = state
            .bookings
            .iter()
            .find(|b| b.event_id == event.id && b.email == email.as_str())
        {
            return Ok((existing.clone(), false));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            event_id: event.id,
            slug: event.slug,
            email: email.into_string(),
            created_at: Utc::now(),
        };
        self.writes.fetch_add(1, Ordering::SeqCst);
        state.bookings.push(booking.clone());
        Ok((booking, true))
    }

    async fn count_bookings(&self, event_id: Uuid) -> Result<i64, DbError> {
        let state = self.state.read().await;
        let count = state.bookings.iter().filter(|b| b.event_id == event_id).count();
        Ok(count as i64)
    }
}
