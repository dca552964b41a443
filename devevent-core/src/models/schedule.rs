//! Date and time normalization for event schedules
//!
//! Dates are stored as ISO `YYYY-MM-DD`, times as 24-hour `HH:MM`.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];
const TIME_LAYOUTS: &[&str] = &["%H:%M", "%I:%M %p", "%I:%M%p"];

/// `9 AM`, `11pm`
static HOUR_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\s*(AM|PM)$").expect("invalid hour regex"));

/// Normalize a date to `YYYY-MM-DD`.
pub fn normalize_date(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "date" });
    }

    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(trimmed, layout).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| ValidationError::Unparseable {
            field: "date",
            value: trimmed.to_owned(),
        })
}

/// Normalize a time to 24-hour `HH:MM`.
pub fn normalize_time(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "time" });
    }

    let mut candidate = trimmed.to_ascii_uppercase();
    if let Some(caps) = HOUR_ONLY_RE.captures(&candidate) {
        candidate = format!("{}:00 {}", &caps[1], &caps[2]);
    }

    TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveTime::parse_from_str(&candidate, layout).ok())
        .map(|time| time.format("%H:%M").to_string())
        .ok_or_else(|| ValidationError::Unparseable {
            field: "time",
            value: trimmed.to_owned(),
        })
}
