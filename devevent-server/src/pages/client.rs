//! Internal JSON API client for page rendering
//!
//! Pages consume the same API external clients do, over HTTP against the
//! configured base URL.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use tracing::debug;

use devevent_core::Event;

use crate::http::routes::bookings::{BookingRequest, BookingResponse};
use crate::http::routes::events::{EventDetailResponse, EventsResponse};
use crate::http::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("invalid base URL '{url}': {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("event '{0}' not found")]
    NotFound(String),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// HTTP client bound to the API base URL
#[derive(Debug, Clone)]
pub struct EventsClient {
    client: reqwest::Client,
    base: Url,
}

impl EventsClient {
    pub fn new(base_url: &str) -> Result<Self, PageError> {
        let base = Url::parse(base_url).map_err(|e| PageError::BaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(PageError::BaseUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".into(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Join percent-encoded path segments onto the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, PageError> {
        let response = self.client.get(self.endpoint(&["api", "events"])).send().await?;
        let body: EventsResponse = decode(response, None).await?;
        Ok(body.events)
    }

    /// Event plus its booking count.
    pub async fn get_event(&self, slug: &str) -> Result<(Event, i64), PageError> {
        let url = self.endpoint(&["api", "events", slug]);
        debug!(%url, "fetching event");
        let response = self.client.get(url).send().await?;
        let body: EventDetailResponse = decode(response, Some(slug)).await?;
        Ok((body.event, body.bookings))
    }

    pub async fn similar_events(&self, slug: &str) -> Result<Vec<Event>, PageError> {
        let url = self.endpoint(&["api", "events", slug, "similar"]);
        let response = self.client.get(url).send().await?;
        let body: EventsResponse = decode(response, Some(slug)).await?;
        Ok(body.events)
    }

    pub async fn book(&self, slug: &str, email: &str) -> Result<BookingResponse, PageError> {
        let request = BookingRequest {
            slug: slug.to_string(),
            email: email.to_string(),
        };
        let response = self
            .client
            .post(self.endpoint(&["api", "bookings"]))
            .json(&request)
            .send()
            .await?;
        decode(response, Some(slug)).await
    }
}

/// Decode a success envelope, or turn an error envelope into `PageError`.
async fn decode<T>(response: reqwest::Response, slug: Option<&str>) -> Result<T, PageError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    if status == StatusCode::NOT_FOUND {
        if let Some(slug) = slug {
            return Err(PageError::NotFound(slug.to_string()));
        }
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.error.unwrap_or(body.message),
        Err(_) => text,
    };

    Err(PageError::Api {
        status: status.as_u16(),
        message,
    })
}
