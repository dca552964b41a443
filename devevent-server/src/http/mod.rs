//! HTTP layer
//!
//! Axum server with:
//! - JSON API under `/api`
//! - CORS (localhost only by default)
//! - Request tracing and timeout
//! - Graceful shutdown
//! - JSON error envelopes

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
