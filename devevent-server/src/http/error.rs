//! API error type with IntoResponse
//!
//! Every failure leaves a handler as the JSON envelope
//! `{ "message": ..., "error"?: ..., "status": n }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use devevent_core::ValidationError;

use crate::db::DbError;
use crate::upload::UploadError;

/// Error envelope as serialized on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status: u16,
}

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request (400)
    BadRequest { message: String },

    /// Field validation failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Unique constraint hit (409)
    Conflict { resource: &'static str, id: String },

    /// Upstream failure (500, logged); `error` carries the underlying message
    Failed { message: &'static str, error: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Replace the headline of a 500 with a route-specific one.
    pub fn on_failure(self, message: &'static str) -> Self {
        match self {
            Self::Failed { error, .. } => Self::Failed { message, error },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, error) = match self {
            Self::BadRequest { message } => (message.clone(), None),
            Self::Validation(e) => (e.to_string(), None),
            Self::NotFound { resource, id } => (format!("{resource} '{id}' not found"), None),
            Self::Conflict { resource, id } => {
                (format!("{resource} '{id}' already exists"), None)
            }
            Self::Failed { message, error } => ((*message).to_string(), Some(error.clone())),
        };

        ErrorBody {
            message,
            error,
            status: self.status().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Failed { message, error } = &self {
            tracing::error!(%error, "{}", message);
        }

        (self.status(), Json(self.body())).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { resource, id } => Self::Conflict { resource, id },
            other => Self::Failed {
                message: "Request Failed",
                error: other.to_string(),
            },
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        Self::Failed {
            message: "Image Upload Failed",
            error: e.to_string(),
        }
    }
}
