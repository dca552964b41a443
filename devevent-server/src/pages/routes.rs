//! Page routes
//!
//! Each handler fetches through [`EventsClient`](super::EventsClient) and
//! renders HTML. Unknown events get the 404 page.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::client::PageError;
use super::render::{self, BookingWidget, DetailView};
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub email: String,
}

fn page_error(err: PageError) -> Response {
    match err {
        PageError::NotFound(slug) => {
            info!(%slug, "event page not found");
            (StatusCode::NOT_FOUND, Html(render::not_found_page())).into_response()
        }
        other => {
            error!(error = %other, "page rendering failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render::error_page(&other.to_string())),
            )
                .into_response()
        }
    }
}

async fn load_detail(
    state: &AppState,
    slug: &str,
    widget: BookingWidget,
) -> Result<DetailView, PageError> {
    let ((event, bookings), similar) = tokio::try_join!(
        state.pages.get_event(slug),
        state.pages.similar_events(slug)
    )?;

    Ok(DetailView {
        event,
        bookings,
        similar,
        widget,
    })
}

/// GET /
async fn home(State(state): State<Arc<AppState>>) -> Response {
    match state.pages.list_events().await {
        Ok(events) => Html(render::listing_page(&events)).into_response(),
        Err(e) => page_error(e),
    }
}

/// GET /events/{slug}
async fn event_page(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> Response {
    match load_detail(&state, &slug, BookingWidget::default()).await {
        Ok(view) => Html(render::detail_page(&view)).into_response(),
        Err(e) => page_error(e),
    }
}

/// POST /events/{slug}/book - booking widget submission
async fn book_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Form(form): Form<BookForm>,
) -> Response {
    let (widget, status) = match state.pages.book(&slug, &form.email).await {
        Ok(booking) => {
            info!(
                target: "analytics",
                event = "event_booked",
                slug = %slug,
                event_id = %booking.booking.event_id,
                created = booking.status == StatusCode::CREATED.as_u16(),
            );
            (BookingWidget::Booked, StatusCode::OK)
        }
        Err(PageError::NotFound(slug)) => return page_error(PageError::NotFound(slug)),
        Err(e) => {
            warn!(
                target: "analytics",
                event = "booking_failed",
                slug = %slug,
                error = %e,
            );
            let (message, status) = match &e {
                PageError::Api { status, message } if *status < 500 => {
                    (message.clone(), StatusCode::BAD_REQUEST)
                }
                _ => (
                    "Booking failed, please try again.".to_string(),
                    StatusCode::INTERNAL_SERVER_ERROR,
                ),
            };
            let widget = BookingWidget::Form {
                email: form.email,
                error: Some(message),
            };
            (widget, status)
        }
    };

    match load_detail(&state, &slug, widget).await {
        Ok(view) => (status, Html(render::detail_page(&view))).into_response(),
        Err(e) => page_error(e),
    }
}

/// Page routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/events/{slug}", get(event_page))
        .route("/events/{slug}/book", post(book_event))
}
