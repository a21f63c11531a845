use chrono::{DateTime, NaiveDate};

/// Malformed or missing input detected at a component boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    #[error("a posting needs at least one non-empty requirement")]
    NoRequirements,
    #[error("'{value}' is not a valid date (expected YYYY-MM-DD or RFC 3339)")]
    MalformedDate { value: String },
    #[error("'{label}' is not a month label (expected YYYY-MM or a month name)")]
    MalformedMonth { label: String },
    #[error("'{value}' is not a valid applicant category (fresher, intern, experienced)")]
    UnknownApplicantCategory { value: String },
    #[error("'{value}' is not a valid application status (pending, selected, rejected)")]
    UnknownStatus { value: String },
    #[error("{field} must be a non-negative whole number, found '{value}'")]
    InvalidCompensation { field: &'static str, value: String },
    #[error("{field} may be at most {max}, found {value}")]
    WindowTooLarge {
        field: &'static str,
        max: usize,
        value: usize,
    },
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

/// Parses a calendar date as sent by the remote API or a CSV export.
///
/// Accepts `YYYY-MM-DD` and RFC 3339 timestamps; the timestamp's own offset decides the date.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }

    Err(ValidationError::MalformedDate {
        value: raw.to_string(),
    })
}
