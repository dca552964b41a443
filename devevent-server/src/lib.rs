//! devevent-server: HTTP API, server-rendered pages and storage for DevEvent
//!
//! - `db`: Postgres pool behind the connection cache, migrations, repositories
//! - `store`: the [`EventStore`](store::EventStore) seam used by handlers
//! - `upload`: image hosting
//! - `http`: JSON API, server setup
//! - `pages`: HTML pages fetched through the JSON API

pub mod db;
pub mod http;
pub mod pages;
pub mod store;
pub mod upload;

pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use pages::EventsClient;
pub use store::{EventStore, MemoryEventStore, PgEventStore};
pub use upload::{CloudinaryUploader, DisabledUploader, ImageUploader, UploadError};
