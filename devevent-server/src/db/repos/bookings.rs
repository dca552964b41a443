//! Booking repository
//!
//! Bookings are unique per (event, email). A repeat submission returns the
//! existing row instead of failing.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use devevent_core::{Booking, BookingEmail, Event};

use crate::db::DbError;

#[derive(Debug, FromRow)]
struct BookingRow {
    id: Uuid,
    event_id: Uuid,
    email: String,
    created_at: DateTime<Utc>,
    created: bool,
}

/// Booking repository
pub struct BookingRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> BookingRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Book `email` onto `event`, returning the booking and whether it is new.
    ///
    /// Single statement: the CTE inserts unless the pair exists; the UNION
    /// arm returns the pre-existing row in that case.
    pub async fn create(&self, event: &Event, email: &BookingEmail) -> Result<(Booking, bool), DbError> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            WITH inserted AS (
                INSERT INTO bookings (id, event_id, email)
                VALUES ($1, $2, $3)
                ON CONFLICT (event_id, email) DO NOTHING
                RETURNING id, event_id, email, created_at
            )
            SELECT id, event_id, email, created_at, TRUE AS created FROM inserted
            UNION ALL
            SELECT id, event_id, email, created_at, FALSE AS created
            FROM bookings
            WHERE event_id = $2 AND email = $3
            LIMIT 1
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.id)
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        // A concurrent insert of the same pair commits after our snapshot was
        // taken; it is visible to a fresh statement.
        let row = match row {
            Some(row) => row,
            None => sqlx::query_as(
                r#"
                SELECT id, event_id, email, created_at, FALSE AS created
                FROM bookings
                WHERE event_id = $1 AND email = $2
                "#,
            )
            .bind(event.id)
            .bind(email.as_str())
            .fetch_one(self.pool)
            .await?,
        };

        let booking = Booking {
            id: row.id,
            event_id: row.event_id,
            slug: event.slug.clone(),
            email: row.email,
            created_at: row.created_at,
        };
        Ok((booking, row.created))
    }

    /// Number of bookings for an event.
    pub async fn count_for_event(&self, event_id: Uuid) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
