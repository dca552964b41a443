//! PostgreSQL-backed event store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use devevent_core::{Booking, BookingEmail, CacheState, Event, NewEvent};

use super::EventStore;
use crate::db::{BookingRepo, DbError, EventRepo, PgCache};

/// Event store that reaches Postgres through the shared connection cache
#[derive(Clone)]
pub struct PgEventStore {
    cache: Arc<PgCache>,
}

impl PgEventStore {
    pub fn new(cache: Arc<PgCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<PgCache> {
        &self.cache
    }

    /// Ensure the pool is connected; concurrent callers share one attempt.
    async fn pool(&self) -> Result<PgPool, DbError> {
        self.cache.get().await.map_err(DbError::Connection)
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create_event(&self, event: NewEvent, image_url: String) -> Result<Event, DbError> {
        let pool = self.pool().await?;
        let event = Event::from_new(event, image_url, Utc::now());
        debug!(slug = %event.slug, "inserting event");
        EventRepo::new(&pool).insert(&event).await
    }

    async fn list_events(&self) -> Result<Vec<Event>, DbError> {
        let pool = self.pool().await?;
        EventRepo::new(&pool).list_recent().await
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Event, DbError> {
        let pool = self.pool().await?;
        EventRepo::new(&pool).get_by_slug(slug).await
    }

    async fn find_similar_events(&self, slug: &str, limit: usize) -> Result<Vec<Event>, DbError> {
        let pool = self.pool().await?;
        let repo = EventRepo::new(&pool);
        let source = repo.get_by_slug(slug).await?;
        repo.similar_to(&source, i64::try_from(limit).unwrap_or(i64::MAX))
            .await
    }

    async fn create_booking(
        &self,
        slug: &str,
        email: BookingEmail,
    ) -> Result<(Booking, bool), DbError> {
        let pool = self.pool().await?;
        let event = EventRepo::new(&pool).get_by_slug(slug).await?;
        BookingRepo::new(&pool).create(&event, &email).await
    }

    async fn count_bookings(&self, event_id: Uuid) -> Result<i64, DbError> {
        let pool = self.pool().await?;
        BookingRepo::new(&pool).count_for_event(event_id).await
    }

    fn connection_state(&self) -> CacheState {
        self.cache.state()
    }

    fn connection_attempts(&self) -> u64 {
        self.cache.attempts()
    }
}
