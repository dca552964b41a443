//! Schema migrations for event and booking tables
//!
//! Every statement is idempotent, so running on each new connection pool is safe.

use sqlx::PgPool;

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id UUID PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            overview TEXT NOT NULL,
            image TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            location TEXT NOT NULL,
            mode TEXT NOT NULL CHECK (mode IN ('online', 'offline', 'hybrid')),
            audience TEXT NOT NULL,
            organizer TEXT NOT NULL,
            agenda TEXT[] NOT NULL,
            tags TEXT[] NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY,
            event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            email TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (event_id, email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Listing is always newest first
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_created_at ON events (created_at DESC)")
        .execute(pool)
        .await?;

    // Tag overlap (&&) for similar events
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_tags ON events USING GIN (tags)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_event_id ON bookings (event_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations complete");
    Ok(())
}
