//! Custom Axum extractors

use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Request};

use devevent_core::EventDraft;

use super::error::ApiError;

/// Uploaded image part
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `POST /api/events` body: text fields, an `image` file part, and
/// JSON-encoded `tags` and `agenda` arrays.
#[derive(Debug)]
pub struct EventForm {
    pub draft: EventDraft,
    pub image: ImageFile,
}

const INVALID_JSON: &str = "Invalid JSON data format";

impl<S> FromRequest<S> for EventForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        let mut draft = EventDraft::default();
        let mut image = None;
        let mut tags = None;
        let mut agenda = None;

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == "image" {
                image = read_image(field).await?;
                continue;
            }

            let value = field.text().await.map_err(bad_multipart)?;
            match name.as_str() {
                "title" => draft.title = value,
                "description" => draft.description = value,
                "overview" => draft.overview = value,
                "date" => draft.date = value,
                "time" => draft.time = value,
                "location" => draft.location = value,
                "mode" => draft.mode = value,
                "audience" => draft.audience = value,
                "organizer" => draft.organizer = value,
                "tags" => tags = Some(value),
                "agenda" => agenda = Some(value),
                _ => {}
            }
        }

        let image = image.ok_or_else(|| ApiError::bad_request("Image file is required"))?;
        draft.tags = parse_string_array(tags.as_deref())?;
        draft.agenda = parse_string_array(agenda.as_deref())?;

        Ok(Self { draft, image })
    }
}

/// A part only counts as an image when it is a non-empty file.
async fn read_image(field: Field<'_>) -> Result<Option<ImageFile>, ApiError> {
    let Some(filename) = field.file_name().map(str::to_owned) else {
        return Ok(None);
    };
    let bytes = field.bytes().await.map_err(bad_multipart)?;
    if bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(ImageFile {
        filename,
        bytes: bytes.to_vec(),
    }))
}

/// Absent means empty; present must be a JSON array of strings.
fn parse_string_array(raw: Option<&str>) -> Result<Vec<String>, ApiError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => {
            serde_json::from_str(raw).map_err(|_| ApiError::bad_request(INVALID_JSON))
        }
    }
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::bad_request(e.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_arrays() {
        assert_eq!(
            parse_string_array(Some(r#"["rust","web"]"#)).unwrap(),
            vec!["rust".to_string(), "web".to_string()]
        );
        assert!(parse_string_array(None).unwrap().is_empty());
        assert!(parse_string_array(Some("rust, web")).is_err());
        assert!(parse_string_array(Some("[1, 2]")).is_err());
    }
}
