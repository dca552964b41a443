//! Subcommand implementations

pub mod config;
pub mod migrate;
pub mod serve;

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use devevent_core::{DevEventConfig, FileConfig};

pub use config::run_config;
pub use migrate::run_migrate;
pub use serve::run_serve;

/// Settings that can be given on the command line, taking priority over the
/// environment and the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct Overrides {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Address to bind to
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Base URL pages use to reach the JSON API
    #[arg(long)]
    pub base_url: Option<String>,
}

impl Overrides {
    /// Resolve the full configuration: flags > environment > file > defaults.
    pub fn resolve(&self, config_path: Option<&Path>) -> Result<DevEventConfig> {
        let file = FileConfig::load_or_default(config_path).context("Failed to load config file")?;

        let bind = self.bind.map(|addr| addr.to_string());
        DevEventConfig::resolve(file, |key| {
            let flag = match key {
                "DATABASE_URL" => self.database_url.clone(),
                "DEVEVENT_BIND" => bind.clone(),
                "BASE_URL" => self.base_url.clone(),
                _ => None,
            };
            flag.or_else(|| std::env::var(key).ok())
        })
        .context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_win_over_environment() {
        let overrides = Overrides {
            database_url: Some("postgres://flag/devevent".into()),
            bind: Some(SocketAddr::from(([0, 0, 0, 0], 8080))),
            base_url: Some("https://events.example/".into()),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbind = \"127.0.0.1:9999\"\n").unwrap();

        let config = overrides.resolve(Some(&path)).unwrap();
        assert_eq!(config.database_url, "postgres://flag/devevent");
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.base_url, "https://events.example");
    }
}
