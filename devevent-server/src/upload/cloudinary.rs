//! Cloudinary signed upload
//!
//! POST `{base}/v1_1/{cloud}/image/upload` as multipart with `file`,
//! `api_key`, `timestamp`, `folder` and `signature`. The signature is the
//! SHA-1 hex of the sorted signed params joined with `&`, followed by the
//! API secret.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use devevent_core::CloudinaryCredentials;

use super::{ImageUploader, UploadError};

const API_BASE_URL: &str = "https://api.cloudinary.com";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryUploader {
    client: reqwest::Client,
    credentials: CloudinaryCredentials,
    folder: String,
    base_url: String,
}

impl CloudinaryUploader {
    pub fn new(credentials: CloudinaryCredentials, folder: impl Into<String>) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            credentials,
            folder: folder.into(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.base_url.trim_end_matches('/'),
            self.credentials.cloud_name
        )
    }
}

/// Sign `params` the way the upload API expects.
pub(crate) fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageUploader for CloudinaryUploader {
    async fn upload(&self, bytes: Vec<u8>, filename: String) -> Result<String, UploadError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", self.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.credentials.api_secret,
        );

        debug!(size = bytes.len(), folder = %self.folder, "uploading image");

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(filename))
            .text("api_key", self.credentials.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature", signature);

        let response = self.client.post(self.endpoint()).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(status = %status, %message, "image upload rejected");
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: UploadResponse = response.json().await?;
        parsed.secure_url.ok_or(UploadError::MissingUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> CloudinaryCredentials {
        CloudinaryCredentials {
            cloud_name: "demo".into(),
            api_key: "1234".into(),
            api_secret: "abcd".into(),
        }
    }

    #[test]
    fn signature_matches_documented_example() {
        let sig = sign(
            &[("timestamp", "1315060510"), ("public_id", "sample_image")],
            "abcd",
        );
        assert_eq!(sig, "b4ad47fb4e25c7bf5f92a20089f9db59bc302313");
    }

    #[test]
    fn signature_sorts_params() {
        let a = sign(&[("folder", "DevEvent"), ("timestamp", "1315060510")], "abcd");
        let b = sign(&[("timestamp", "1315060510"), ("folder", "DevEvent")], "abcd");
        assert_eq!(a, b);
        assert_eq!(a, "a25b5d69cb7fe2e8328c2a5666a8578ccd13650c");
    }

    #[tokio::test]
    async fn upload_returns_secure_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "public_id": "DevEvent/abc",
                "secure_url": "https://res.cloudinary.com/demo/image/upload/DevEvent/abc.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uploader = CloudinaryUploader::new(credentials(), "DevEvent")
            .unwrap()
            .with_base_url(server.uri());

        let url = uploader.upload(b"png".to_vec(), "abc.png".into()).await.unwrap();
        assert_eq!(url, "https://res.cloudinary.com/demo/image/upload/DevEvent/abc.png");
    }

    #[tokio::test]
    async fn rejected_upload_surfaces_host_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "message": "Invalid Signature" }
            })))
            .mount(&server)
            .await;

        let uploader = CloudinaryUploader::new(credentials(), "DevEvent")
            .unwrap()
            .with_base_url(server.uri());

        match uploader.upload(b"png".to_vec(), "abc.png".into()).await {
            Err(UploadError::Rejected { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn response_without_url_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let uploader = CloudinaryUploader::new(credentials(), "DevEvent")
            .unwrap()
            .with_base_url(server.uri());

        let err = uploader.upload(vec![0], "x.png".into()).await.unwrap_err();
        assert!(matches!(err, UploadError::MissingUrl));
    }
}
