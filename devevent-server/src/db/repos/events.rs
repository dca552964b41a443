//! Event repository
//!
//! - insert: plain INSERT, unique slug violation becomes `Conflict`
//! - list: newest first
//! - similar: tag overlap (`&&`) against the source event

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use devevent_core::{Event, EventMode};

use crate::db::{conflict_on_unique, DbError};

const EVENT_COLUMNS: &str = "id, slug, title, description, overview, image, date, time, \
    location, mode, audience, organizer, agenda, tags, created_at, updated_at";

/// Event record as stored
#[derive(Debug, Clone, FromRow)]
struct EventRow {
    id: Uuid,
    slug: String,
    title: String,
    description: String,
    overview: String,
    image: String,
    date: String,
    time: String,
    location: String,
    mode: String,
    audience: String,
    organizer: String,
    agenda: Vec<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = DbError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let mode: EventMode = row
            .mode
            .parse()
            .map_err(|e| DbError::Decode(format!("event '{}': {}", row.slug, e)))?;

        Ok(Event {
            id: row.id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            overview: row.overview,
            image: row.image,
            date: row.date,
            time: row.time,
            location: row.location,
            mode,
            audience: row.audience,
            organizer: row.organizer,
            agenda: row.agenda,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn decode_all(rows: Vec<EventRow>) -> Result<Vec<Event>, DbError> {
    rows.into_iter().map(Event::try_from).collect()
}

/// Event repository
pub struct EventRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fully-built event.
    pub async fn insert(&self, event: &Event) -> Result<Event, DbError> {
        let row: EventRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO events (
                id, slug, title, description, overview, image, date, time,
                location, mode, audience, organizer, agenda, tags, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(&event.slug)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.image)
        .bind(&event.date)
        .bind(&event.time)
        .bind(&event.location)
        .bind(event.mode.as_str())
        .bind(&event.audience)
        .bind(&event.organizer)
        .bind(&event.agenda)
        .bind(&event.tags)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "event", &event.slug))?;

        row.try_into()
    }

    /// All events, most recently created first.
    pub async fn list_recent(&self) -> Result<Vec<Event>, DbError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        decode_all(rows)
    }

    /// Get a single event by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Event, DbError> {
        let row: EventRow = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("event", slug))?;

        row.try_into()
    }

    /// Events sharing at least one tag with `source`, excluding it, newest first.
    pub async fn similar_to(&self, source: &Event, limit: i64) -> Result<Vec<Event>, DbError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE id <> $1 AND tags && $2
            ORDER BY created_at DESC
            LIMIT $3
            "#
        ))
        .bind(source.id)
        .bind(&source.tags)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        decode_all(rows)
    }
}
