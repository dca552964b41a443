//! Configuration loading
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. TOML file (`~/.devevent/config.toml` or an explicit path)
//! 3. Environment variables (after `.env` files are loaded)
//! 4. CLI flags (applied by devevent-cli)
//!
//! `DATABASE_URL` has no default; resolving without it is an error.

use std::fmt;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_UPLOAD_FOLDER: &str = "DevEvent";

/// Load environment variables from .env files
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.devevent/.env
pub fn load_dotenv() {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path.display().to_string());
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            // dotenvy never overwrites variables that are already set
            match dotenvy::from_path(&env_file) {
                Ok(()) => loaded_from.push(env_file.display().to_string()),
                Err(e) => debug!("Failed to load {}: {}", env_file.display(), e),
            }
        }
    }

    if loaded_from.is_empty() {
        debug!("No .env files found, using process environment only");
    } else {
        info!("Loaded environment from: {}", loaded_from.join(", "));
    }
}

/// Get the devevent config directory path (~/.devevent)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".devevent"))
}

/// Default config file path (~/.devevent/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

// ============================================================================
// TOML Configuration
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub upload: UploadSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub base_url: Option<String>,
    pub cors_permissive: Option<bool>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadSection {
    /// Folder uploaded images are stored under
    pub folder: Option<String>,
}

impl FileConfig {
    /// Parse a config file. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicit path, or the default path if it exists, or defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// Cloudinary API credentials
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryCredentials {
    /// Parse `cloudinary://<api_key>:<api_secret>@<cloud_name>`
    pub fn from_url(url: &str) -> Result<Self> {
        let rest = url
            .trim()
            .strip_prefix("cloudinary://")
            .ok_or_else(|| CoreError::invalid("CLOUDINARY_URL", "expected cloudinary:// scheme"))?;

        let (credentials, cloud_name) = rest
            .rsplit_once('@')
            .ok_or_else(|| CoreError::invalid("CLOUDINARY_URL", "missing @<cloud_name>"))?;
        let (api_key, api_secret) = credentials
            .split_once(':')
            .ok_or_else(|| CoreError::invalid("CLOUDINARY_URL", "missing <api_key>:<api_secret>"))?;

        if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
            return Err(CoreError::invalid("CLOUDINARY_URL", "empty component"));
        }

        Ok(Self {
            cloud_name: cloud_name.to_owned(),
            api_key: api_key.to_owned(),
            api_secret: api_secret.to_owned(),
        })
    }
}

impl fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct DevEventConfig {
    pub database_url: String,
    /// Base URL pages use to fetch the JSON API
    pub base_url: String,
    pub bind: SocketAddr,
    pub cors_permissive: bool,
    pub request_timeout_secs: u64,
    pub max_connections: u32,
    pub upload_folder: String,
    pub cloudinary: Option<CloudinaryCredentials>,
}

impl DevEventConfig {
    /// Resolve from a file config and the process environment.
    pub fn from_env(file: FileConfig) -> Result<Self> {
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Resolve from a file config and an arbitrary variable lookup.
    pub fn resolve<F>(file: FileConfig, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or_else(|| {
            CoreError::missing(
                "DATABASE_URL",
                "define it in the environment, ./.env or ~/.devevent/.env",
            )
        })?;
        if !(database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")) {
            return Err(CoreError::invalid(
                "DATABASE_URL",
                "expected a postgres:// connection string",
            ));
        }

        let bind_raw = var("DEVEVENT_BIND")
            .or(file.server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind: SocketAddr = bind_raw
            .parse()
            .map_err(|e| CoreError::invalid("DEVEVENT_BIND", format!("{bind_raw}: {e}")))?;

        let base_url = var("BASE_URL")
            .or(file.server.base_url)
            .unwrap_or_else(|| base_url_for(bind))
            .trim_end_matches('/')
            .to_owned();

        let cloudinary = match var("CLOUDINARY_URL") {
            Some(url) => Some(CloudinaryCredentials::from_url(&url)?),
            None => match (
                var("CLOUDINARY_CLOUD_NAME"),
                var("CLOUDINARY_API_KEY"),
                var("CLOUDINARY_API_SECRET"),
            ) {
                (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials {
                    cloud_name,
                    api_key,
                    api_secret,
                }),
                _ => None,
            },
        };

        Ok(Self {
            database_url,
            base_url,
            bind,
            cors_permissive: file.server.cors_permissive.unwrap_or(false),
            request_timeout_secs: file
                .server
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_connections: file
                .database
                .max_connections
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            upload_folder: file
                .upload
                .folder
                .unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.to_owned()),
            cloudinary,
        })
    }

    /// Database URL with the password replaced, for logs.
    pub fn redacted_database_url(&self) -> String {
        redact_url_password(&self.database_url)
    }
}

/// Local URL that reaches a server bound to `bind`.
fn base_url_for(bind: SocketAddr) -> String {
    let mut addr = bind;
    if addr.ip().is_unspecified() {
        let loopback = match addr {
            SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
            SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
        };
        addr.set_ip(loopback);
    }
    format!("http://{addr}")
}

fn redact_url_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_owned();
    };
    let Some((userinfo, host)) = rest.rsplit_once('@') else {
        return url.to_owned();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_owned(),
    }
}

impl fmt::Display for DevEventConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "database_url         = {}", self.redacted_database_url())?;
        writeln!(f, "base_url             = {}", self.base_url)?;
        writeln!(f, "bind                 = {}", self.bind)?;
        writeln!(f, "cors_permissive      = {}", self.cors_permissive)?;
        writeln!(f, "request_timeout_secs = {}", self.request_timeout_secs)?;
        writeln!(f, "max_connections      = {}", self.max_connections)?;
        writeln!(f, "upload_folder        = {}", self.upload_folder)?;
        match &self.cloudinary {
            Some(c) => write!(f, "cloudinary           = {} (key {})", c.cloud_name, c.api_key),
            None => write!(f, "cloudinary           = <not configured>"),
        }
    }
}
