//! HTTP server command
//!
//! Runs the JSON API and the server-rendered pages. The database is
//! connected on first use through the connection cache.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use devevent_server::db::PgConnector;
use devevent_server::{
    run_server, AppState, CloudinaryUploader, DisabledUploader, EventsClient, ImageUploader,
    PgEventStore, ServerConfig,
};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: super::Overrides,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Connect (and migrate) before accepting requests instead of on first use
    #[arg(long)]
    pub connect_now: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = args.overrides.resolve(config_path)?;
    config.cors_permissive |= args.cors_permissive;

    info!(
        bind = %config.bind,
        base_url = %config.base_url,
        database = %config.redacted_database_url(),
        "Starting devevent server"
    );

    let cache = Arc::new(
        PgConnector::new(&config.database_url)
            .with_max_connections(config.max_connections)
            .into_cache(),
    );
    if args.connect_now {
        cache
            .get()
            .await
            .context("Failed to connect to database")?;
        info!("Database connected");
    }

    let uploader: Arc<dyn ImageUploader> = match config.cloudinary.clone() {
        Some(credentials) => Arc::new(
            CloudinaryUploader::new(credentials, config.upload_folder.clone())
                .context("Failed to build image uploader")?,
        ),
        None => {
            warn!("Cloudinary is not configured; event creation will fail until CLOUDINARY_URL is set");
            Arc::new(DisabledUploader)
        }
    };

    let pages = EventsClient::new(&config.base_url).context("Invalid BASE_URL")?;
    let state = AppState::new(Arc::new(PgEventStore::new(cache)), uploader, pages);

    // Run server (blocks until shutdown)
    run_server(state, ServerConfig::from(&config))
        .await
        .context("Server error")?;

    Ok(())
}
