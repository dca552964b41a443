//! Event model
//!
//! `EventDraft` is raw client input, `NewEvent` is validated input waiting
//! for its image upload, `Event` is the persisted record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::{normalize_date, normalize_time};
use super::validation::required_text;
use super::ValidationError;
use crate::slug::Slug;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_OVERVIEW_LEN: usize = 500;
/// Location, audience, organizer
pub const MAX_DETAIL_LEN: usize = 500;
pub const MAX_LIST_ITEM_LEN: usize = 200;

/// How attendees take part in an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    Online,
    Offline,
    Hybrid,
}

impl EventMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for EventMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(ValidationError::InvalidVariant {
                field: "mode",
                value: s.to_owned(),
            }),
        }
    }
}

/// Unvalidated event fields as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub overview: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub mode: String,
    pub audience: String,
    pub organizer: String,
    pub agenda: Vec<String>,
    pub tags: Vec<String>,
}

impl EventDraft {
    /// Validate and normalize every field.
    ///
    /// The slug is derived from the title; dates and times are normalized;
    /// tags are trimmed and de-duplicated keeping first-seen order.
    pub fn validate(self) -> Result<NewEvent, ValidationError> {
        let title = required_text("title", &self.title, MAX_TITLE_LEN)?;
        let slug = Slug::from_title(&title)?;

        Ok(NewEvent {
            slug,
            title,
            description: required_text("description", &self.description, MAX_DESCRIPTION_LEN)?,
            overview: required_text("overview", &self.overview, MAX_OVERVIEW_LEN)?,
            date: normalize_date(&self.date)?,
            time: normalize_time(&self.time)?,
            location: required_text("location", &self.location, MAX_DETAIL_LEN)?,
            mode: self.mode.parse()?,
            audience: required_text("audience", &self.audience, MAX_DETAIL_LEN)?,
            organizer: required_text("organizer", &self.organizer, MAX_DETAIL_LEN)?,
            agenda: validate_agenda(self.agenda)?,
            tags: validate_tags(self.tags)?,
        })
    }
}

fn validate_agenda(items: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let agenda = items
        .iter()
        .map(|item| required_text("agenda item", item, MAX_LIST_ITEM_LEN))
        .collect::<Result<Vec<_>, _>>()?;

    if agenda.is_empty() {
        return Err(ValidationError::Empty { field: "agenda" });
    }
    Ok(agenda)
}

fn validate_tags(items: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let mut tags: Vec<String> = Vec::with_capacity(items.len());
    for item in &items {
        let tag = required_text("tag", item, MAX_LIST_ITEM_LEN)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    if tags.is_empty() {
        return Err(ValidationError::Empty { field: "tags" });
    }
    Ok(tags)
}

/// Validated event, not yet persisted. The image URL is attached at insert time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub overview: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub mode: EventMode,
    pub audience: String,
    pub organizer: String,
    pub agenda: Vec<String>,
    pub tags: Vec<String>,
}

/// Persisted event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub mode: EventMode,
    pub audience: String,
    pub organizer: String,
    pub agenda: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Build the record for a validated event and its uploaded image.
    pub fn from_new(new: NewEvent, image: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            slug: new.slug.into_string(),
            title: new.title,
            description: new.description,
            overview: new.overview,
            image,
            date: new.date,
            time: new.time,
            location: new.location,
            mode: new.mode,
            audience: new.audience,
            organizer: new.organizer,
            agenda: new.agenda,
            tags: new.tags,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the two events have at least one tag in common.
    pub fn shares_tag_with(&self, other: &Event) -> bool {
        self.tags.iter().any(|tag| other.tags.contains(tag))
    }
}
