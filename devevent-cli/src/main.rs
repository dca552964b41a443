//! devevent CLI - developer event listings and bookings
//!
//! - `serve`: JSON API plus server-rendered pages
//! - `migrate`: bring the Postgres schema up to date
//! - `config`: show the resolved configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "devevent",
    author,
    version,
    about = "Developer event listings with image upload and bookings",
    long_about = "Serve the DevEvent JSON API and pages backed by PostgreSQL. Configuration \
                  comes from flags, the environment (.env files included) and \
                  ~/.devevent/config.toml."
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.devevent/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (API and pages)
    Serve(commands::serve::ServeArgs),
    /// Apply database migrations
    Migrate(commands::migrate::MigrateArgs),
    /// Show resolved configuration (secrets redacted)
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    devevent_core::config::load_dotenv();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config_path).await?,
        Commands::Migrate(args) => commands::run_migrate(args, config_path).await?,
        Commands::Config(args) => commands::run_config(args, config_path)?,
    }
    Ok(())
}
