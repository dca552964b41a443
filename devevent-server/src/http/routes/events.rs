//! Event endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use devevent_core::Event;

use crate::http::error::ApiError;
use crate::http::extractors::EventForm;
use crate::http::server::AppState;

/// Multipart bodies carry the banner image
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Upper bound for `?limit=` on the similar-events endpoint
const MAX_SIMILAR_LIMIT: usize = 20;

#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub message: String,
    pub event: Event,
    pub status: u16,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub message: String,
    pub events: Vec<Event>,
    pub status: u16,
}

/// Single event plus its booking count
#[derive(Debug, Serialize, Deserialize)]
pub struct EventDetailResponse {
    pub message: String,
    pub event: Event,
    pub bookings: i64,
    pub status: u16,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimilarParams {
    pub limit: Option<usize>,
}

/// POST /api/events - upload the image, then store the event
async fn create_event(
    State(state): State<Arc<AppState>>,
    form: EventForm,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let new_event = form.draft.validate()?;

    let image_url = state
        .uploader
        .upload(form.image.bytes, form.image.filename)
        .await
        .map_err(|e| ApiError::from(e).on_failure("Event Creation Failed"))?;

    let event = state
        .store
        .create_event(new_event, image_url)
        .await
        .map_err(|e| ApiError::from(e).on_failure("Event Creation Failed"))?;

    info!(slug = %event.slug, "event created");

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            message: "Event Created Successfully".into(),
            event,
            status: StatusCode::CREATED.as_u16(),
        }),
    ))
}

/// GET /api/events - newest first
async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EventsResponse>, ApiError> {
    let events = state
        .store
        .list_events()
        .await
        .map_err(|e| ApiError::from(e).on_failure("Events Fetching Failed"))?;

    Ok(Json(EventsResponse {
        message: "Events Fetched Successfully".into(),
        events,
        status: StatusCode::OK.as_u16(),
    }))
}

/// GET /api/events/{slug}
async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<EventDetailResponse>, ApiError> {
    let event = state
        .store
        .find_event_by_slug(&slug)
        .await
        .map_err(|e| ApiError::from(e).on_failure("Event Fetching Failed"))?;
    let bookings = state
        .store
        .count_bookings(event.id)
        .await
        .map_err(|e| ApiError::from(e).on_failure("Event Fetching Failed"))?;

    Ok(Json(EventDetailResponse {
        message: "Event Fetched Successfully".into(),
        event,
        bookings,
        status: StatusCode::OK.as_u16(),
    }))
}

/// GET /api/events/{slug}/similar?limit=n
async fn similar_events(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    params: Result<Query<SimilarParams>, QueryRejection>,
) -> Result<Json<EventsResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let limit = params
        .limit
        .unwrap_or(state.similar_limit)
        .min(MAX_SIMILAR_LIMIT);

    let events = state
        .store
        .find_similar_events(&slug, limit)
        .await
        .map_err(|e| ApiError::from(e).on_failure("Similar Events Fetching Failed"))?;

    Ok(Json(EventsResponse {
        message: "Similar Events Fetched Successfully".into(),
        events,
        status: StatusCode::OK.as_u16(),
    }))
}

/// Event routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/events",
            get(list_events)
                .post(create_event)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/events/{slug}", get(get_event))
        .route("/api/events/{slug}/similar", get(similar_events))
}
