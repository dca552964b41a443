//! Image hosting
//!
//! Event images are pushed to an external host before the event is stored;
//! only the returned URL is persisted.

pub mod cloudinary;

use async_trait::async_trait;

pub use cloudinary::CloudinaryUploader;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("image upload is not configured (set CLOUDINARY_URL)")]
    NotConfigured,

    #[error("image upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("image host response had no secure_url")]
    MissingUrl,
}

/// Uploads raw image bytes and returns a public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync + 'static {
    async fn upload(&self, bytes: Vec<u8>, filename: String) -> Result<String, UploadError>;
}

/// Stand-in used when no image host credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledUploader;

#[async_trait]
impl ImageUploader for DisabledUploader {
    async fn upload(&self, _bytes: Vec<u8>, _filename: String) -> Result<String, UploadError> {
        Err(UploadError::NotConfigured)
    }
}
