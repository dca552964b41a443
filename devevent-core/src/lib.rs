//! devevent-core: domain types and shared plumbing for DevEvent
//!
//! - [`models`]: validated events and bookings
//! - [`slug`]: slug derivation and parsing
//! - [`connection`]: single-flight, process-wide connection cache
//! - [`config`]: dotenv + TOML + environment configuration

pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod slug;

pub use config::{CloudinaryCredentials, DevEventConfig, FileConfig};
pub use connection::{CacheState, ConnectResult, ConnectionCache, Connector};
pub use error::{CoreError, Result};
pub use models::{Booking, BookingEmail, Event, EventDraft, EventMode, NewEvent, ValidationError};
pub use slug::{slugify, Slug};
