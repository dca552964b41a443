//! Server-rendered pages: event listing, detail and booking widget

pub mod client;
pub mod render;
pub mod routes;

pub use client::{EventsClient, PageError};
pub use routes::router;
