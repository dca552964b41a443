/// Structured error types for devevent-core.
///
/// Uses `thiserror` so the server crate can compose these into its own
/// error enums. The binary (devevent-cli) wraps them with `anyhow`.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for devevent-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file could not be parsed
    #[error("Invalid config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Required environment variable is missing
    #[error("Missing required setting '{key}': {hint}")]
    MissingSetting { key: &'static str, hint: &'static str },

    /// A setting is present but unusable
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}

/// Result type alias for devevent-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a missing setting error
    pub fn missing(key: &'static str, hint: &'static str) -> Self {
        Self::MissingSetting { key, hint }
    }

    /// Create an invalid setting error
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key,
            reason: reason.into(),
        }
    }
}
