//! Database connection pool management
//!
//! The pool is created lazily through [`PgConnector`], which the
//! [`ConnectionCache`](devevent_core::ConnectionCache) drives: the first
//! caller connects and migrates, concurrent callers share that attempt.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use devevent_core::{ConnectionCache, Connector};

use super::migrations;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Shared, lazily-connected pool used by the Postgres store.
pub type PgCache = ConnectionCache<PgConnector>;

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the connection fails.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool("postgres://localhost/devevent").await?;
/// ```
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    create_pool_with_options(database_url, DEFAULT_MAX_CONNECTIONS).await
}

/// Create a PostgreSQL connection pool with custom options.
pub async fn create_pool_with_options(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Connects a pool and brings the schema up to date.
#[derive(Debug, Clone)]
pub struct PgConnector {
    database_url: String,
    max_connections: u32,
}

impl PgConnector {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// Wrap this connector in a fresh connection cache.
    pub fn into_cache(self) -> PgCache {
        ConnectionCache::new(self)
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Connection = PgPool;
    type Error = sqlx::Error;

    async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        let pool = create_pool_with_options(&self.database_url, self.max_connections).await?;
        migrations::run(&pool).await?;
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests require a real database
    // Run with: DATABASE_URL=postgres://... cargo test -p devevent-server -- --ignored

    #[test]
    fn max_connections_is_at_least_one() {
        let connector = PgConnector::new("postgres://localhost/devevent").with_max_connections(0);
        assert_eq!(connector.max_connections, 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn cache_connects_once() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let cache = PgConnector::new(url).into_cache();

        let (a, b) = tokio::join!(cache.get(), cache.get());
        a.expect("first caller failed");
        b.expect("second caller failed");

        let pool = cache.get().await.expect("cached pool");
        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
        assert_eq!(cache.attempts(), 1);
    }
}
