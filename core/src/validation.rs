//! Input validation.
//!
//! Every create/update input is checked here before it reaches the record
//! store, so a [`ValidationError`] always means nothing was written.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Maximum length of an event title.
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum length of an event description.
pub const MAX_DESCRIPTION_LEN: usize = 1000;
/// Maximum length of an event location.
pub const MAX_LOCATION_LEN: usize = 200;
/// Maximum length of an event organizer.
pub const MAX_ORGANIZER_LEN: usize = 100;
/// Maximum length of a user name.
pub const MAX_NAME_LEN: usize = 200;
/// Maximum length of a client-supplied identifier.
pub const MAX_IDENTIFIER_LEN: usize = 128;

const LOCAL_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A field failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    field: &'static str,
    reason: String,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field (as it appears on the wire).
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    /// Why the value was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Requires `value` to be non-blank and at most `max_len` characters.
///
/// # Errors
///
/// Returns [`ValidationError`] for blank or overlong text.
pub fn check_text(field: &'static str, value: &str, max_len: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    let len = value.chars().count();
    if len > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max_len} characters (got {len})"),
        ));
    }

    Ok(())
}

/// Requires a client-supplied identifier to be non-blank, bounded and free of
/// surrounding whitespace.
///
/// # Errors
///
/// Returns [`ValidationError`] for malformed identifiers.
pub fn check_identifier(field: &'static str, value: &str) -> Result<(), ValidationError> {
    check_text(field, value, MAX_IDENTIFIER_LEN)?;
    if value.trim() != value {
        return Err(ValidationError::new(
            field,
            "must not start or end with whitespace",
        ));
    }
    Ok(())
}

/// Accepts RFC 3339 timestamps, ISO-8601 local date-times and `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [`ValidationError`] if no format matches.
pub fn check_event_date(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();

    if DateTime::parse_from_rfc3339(value).is_ok() {
        return Ok(());
    }

    if LOCAL_DATE_TIME_FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
    {
        return Ok(());
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return Ok(());
    }

    Err(ValidationError::new(
        "date",
        "must be an ISO-8601 date-time or a YYYY-MM-DD date",
    ))
}
