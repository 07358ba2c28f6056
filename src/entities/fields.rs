//! Field helpers shared by the entity definitions.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{AppError, Result};

/// Treats empty strings as missing.
pub(crate) fn present(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| !v.is_empty())
}

/// Returns the value of a required text field.
pub fn required_text(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required.", name)))
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(value: &str, name: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation(format!("{} must be a valid date.", name)))
}

/// Formats a list of field names as "a, b, and c".
pub(crate) fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{} and {}", first, second),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}

/// Keeps `current` unless the patch carries a non-empty replacement.
pub(crate) fn keep_or_replace(current: &str, update: Option<String>) -> String {
    update
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| current.to_string())
}

/// Keeps `current` unless the patch carries a non-empty date, which must parse.
pub(crate) fn keep_or_parse(
    current: DateTime<Utc>,
    update: Option<String>,
    name: &str,
) -> Result<DateTime<Utc>> {
    match update.filter(|v| !v.is_empty()) {
        Some(raw) => parse_date(&raw, name),
        None => Ok(current),
    }
}
