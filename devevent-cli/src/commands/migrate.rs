//! Apply the database schema without starting the server

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use devevent_server::db::migrations;
use devevent_server::db::pool::create_pool_with_options;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub overrides: super::Overrides,
}

pub async fn run_migrate(args: MigrateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = args.overrides.resolve(config_path)?;
    info!(database = %config.redacted_database_url(), "Running migrations");

    let pool = create_pool_with_options(&config.database_url, 1)
        .await
        .context("Failed to connect to database")?;
    migrations::run(&pool)
        .await
        .context("Failed to apply migrations")?;
    pool.close().await;

    println!("Migrations applied");
    Ok(())
}
