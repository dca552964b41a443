//! Event store accessor
//!
//! [`EventStore`] is the seam route handlers talk to. The Postgres
//! implementation ensures a connection through the cache before each query;
//! the in-memory implementation backs the test suites.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use devevent_core::{Booking, BookingEmail, CacheState, Event, NewEvent};

use crate::db::DbError;

pub use memory::MemoryEventStore;
pub use postgres::PgEventStore;

/// Default number of similar events shown on a detail page
pub const DEFAULT_SIMILAR_LIMIT: usize = 3;

#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// Persist a validated event with its uploaded image URL.
    async fn create_event(&self, event: NewEvent, image_url: String) -> Result<Event, DbError>;

    /// All events, most recently created first.
    async fn list_events(&self) -> Result<Vec<Event>, DbError>;

    async fn find_event_by_slug(&self, slug: &str) -> Result<Event, DbError>;

    /// Events sharing a tag with `slug`, excluding it, newest first.
    async fn find_similar_events(&self, slug: &str, limit: usize) -> Result<Vec<Event>, DbError>;

    /// Book an email onto an event. Returns `(booking, created)`; `created`
    /// is false when the email already held a booking for that event.
    async fn create_booking(
        &self,
        slug: &str,
        email: BookingEmail,
    ) -> Result<(Booking, bool), DbError>;

    async fn count_bookings(&self, event_id: Uuid) -> Result<i64, DbError>;

    /// State of the underlying connection, for health reporting.
    fn connection_state(&self) -> CacheState {
        CacheState::Connected
    }

    /// Connection attempts started so far.
    fn connection_attempts(&self) -> u64 {
        0
    }
}
