//! Field validation rules for meeting input
//!
//! Every function returns the normalized (trimmed) value on success so callers
//! persist exactly what was validated.

use url::Url;

use crate::constants::{DESCRIPTION_MIN_LENGTH, TITLE_MAX_LENGTH, TITLE_MIN_LENGTH};
use crate::errors::{MeetSchedError, Result};

/// Title must be 3–200 characters after trimming.
///
/// ```
/// use meetsched_domain::validate_title;
///
/// assert_eq!(validate_title("  Office hours ").unwrap(), "Office hours");
/// assert!(validate_title("ab").is_err());
/// ```
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(MeetSchedError::Validation("Title is required".into()));
    }

    let length = trimmed.chars().count();
    if !(TITLE_MIN_LENGTH..=TITLE_MAX_LENGTH).contains(&length) {
        return Err(MeetSchedError::Validation(format!(
            "Title must be between {TITLE_MIN_LENGTH} and {TITLE_MAX_LENGTH} characters"
        )));
    }

    Ok(trimmed.to_string())
}

/// Optional description; when present it must carry at least 10 characters.
pub fn validate_description(description: Option<&str>) -> Result<Option<String>> {
    let Some(description) = description else {
        return Ok(None);
    };

    let trimmed = description.trim();
    if trimmed.chars().count() < DESCRIPTION_MIN_LENGTH {
        return Err(MeetSchedError::Validation(format!(
            "Description must be at least {DESCRIPTION_MIN_LENGTH} characters long"
        )));
    }

    Ok(Some(trimmed.to_string()))
}

/// Optional meeting link; must be an absolute http(s) URL with a host.
pub fn validate_meeting_url(meeting_url: Option<&str>) -> Result<Option<String>> {
    let Some(raw) = meeting_url else {
        return Ok(None);
    };

    let invalid = || MeetSchedError::Validation("Meeting URL must be a valid URL".into());
    let parsed = Url::parse(raw.trim()).map_err(|_| invalid())?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(Some(raw.trim().to_string())),
        _ => Err(invalid()),
    }
}
