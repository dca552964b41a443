//! Axum server setup
//!
//! - CORS limited to the configured base URL's origin unless permissive
//! - Request tracing and timeout
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use reqwest::Url;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use devevent_core::DevEventConfig;

use super::routes;
use crate::pages::{self, EventsClient};
use crate::store::{EventStore, DEFAULT_SIMILAR_LIMIT};
use crate::upload::ImageUploader;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3000)
    pub bind_addr: SocketAddr,

    /// Allow any origin (default: false = `allowed_origin` only)
    pub cors_permissive: bool,

    /// Origin allowed when not permissive, e.g. `http://127.0.0.1:3000`
    pub allowed_origin: String,

    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_permissive: false,
            allowed_origin: "http://127.0.0.1:3000".into(),
            request_timeout_secs: 30,
        }
    }
}

impl From<&DevEventConfig> for ServerConfig {
    fn from(config: &DevEventConfig) -> Self {
        Self {
            bind_addr: config.bind,
            cors_permissive: config.cors_permissive,
            allowed_origin: origin_of(&config.base_url),
            request_timeout_secs: config.request_timeout_secs,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub uploader: Arc<dyn ImageUploader>,
    /// Internal client the page routes use to reach the JSON API
    pub pages: EventsClient,
    pub similar_limit: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EventStore>,
        uploader: Arc<dyn ImageUploader>,
        pages: EventsClient,
    ) -> Self {
        Self {
            store,
            uploader,
            pages,
            similar_limit: DEFAULT_SIMILAR_LIMIT,
        }
    }
}

/// `scheme://host[:port]` of a URL, or the input when it does not parse.
fn origin_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.origin().ascii_serialization(),
        Err(_) => url.trim_end_matches('/').to_owned(),
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match HeaderValue::from_str(&config.allowed_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(origin = %config.allowed_origin, error = %e, "CORS: invalid origin, cross-origin requests disabled");
            layer
        }
    }
}

/// Build the full router: JSON API, pages and health.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(cors_layer(config));

    Router::new()
        .merge(routes::health::router())
        .merge(routes::events::router())
        .merge(routes::bookings::router())
        .merge(pages::router())
        .layer(middleware)
        .with_state(Arc::new(state))
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(store, uploader, EventsClient::new(&config.base_url)?);
/// run_server(state, ServerConfig::from(&config)).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEventStore;
    use crate::upload::DisabledUploader;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(MemoryEventStore::new()),
            Arc::new(DisabledUploader),
            EventsClient::new("http://127.0.0.1:9").unwrap(),
        );
        build_router(state, &ServerConfig::default())
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(!config.cors_permissive);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[tokio::test]
    async fn health_reports_database_state() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "connected");
    }

    #[test]
    fn allowed_origin_follows_base_url() {
        assert_eq!(origin_of("http://127.0.0.1:8080/"), "http://127.0.0.1:8080");
        assert_eq!(origin_of("https://events.example/app"), "https://events.example");
    }

    #[tokio::test]
    async fn cors_allows_only_configured_origin() {
        let config = ServerConfig {
            allowed_origin: "http://127.0.0.1:8080".into(),
            ..ServerConfig::default()
        };
        let router = || {
            build_router(
                AppState::new(
                    Arc::new(MemoryEventStore::new()),
                    Arc::new(DisabledUploader),
                    EventsClient::new("http://127.0.0.1:9").unwrap(),
                ),
                &config,
            )
        };
        let with_origin = |origin: &str| {
            Request::get("/health")
                .header("origin", origin)
                .body(Body::empty())
                .unwrap()
        };

        let response = router()
            .oneshot(with_origin("http://127.0.0.1:8080"))
            .await
            .unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://127.0.0.1:8080"
        );

        let response = router()
            .oneshot(with_origin("http://127.0.0.1:3000"))
            .await
            .unwrap();
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
