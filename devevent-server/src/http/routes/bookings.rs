//! Booking endpoint
//!
//! Repeat bookings for the same (event, email) return the existing booking
//! with 200 instead of 201.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use devevent_core::{Booking, BookingEmail};

use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingRequest {
    pub slug: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub message: String,
    pub booking: Booking,
    pub status: u16,
}

/// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let email = BookingEmail::new(&req.email)?;

    let (booking, created) = state
        .store
        .create_booking(&req.slug, email)
        .await
        .map_err(|e| ApiError::from(e).on_failure("Booking Failed"))?;

    let (status, message) = if created {
        info!(slug = %booking.slug, "booking created");
        (StatusCode::CREATED, "Booking Created Successfully")
    } else {
        (StatusCode::OK, "Already Booked")
    };

    Ok((
        status,
        Json(BookingResponse {
            message: message.into(),
            booking,
            status: status.as_u16(),
        }),
    ))
}

/// Booking routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/bookings", post(create_booking))
}
