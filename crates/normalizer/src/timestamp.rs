//! Rendering of webhook timestamps for display, e.g. `3rd June 2024 - 02:15 PM UTC`.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("timestamp is empty")]
    Empty,
    #[error("invalid timestamp {raw:?}: {source}")]
    Invalid {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Display string for a raw timestamp, together with the instant it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedTimestamp {
    pub display: String,
    pub parsed: Option<DateTime<Utc>>,
}

/// Parses an ISO-8601 timestamp, keeping the offset it was written with. A trailing `Z`
/// means UTC, a missing offset is read as UTC, and a bare date is midnight.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    if raw.is_empty() {
        return Err(TimestampError::Empty);
    }

    let normalized = match raw.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => raw.to_string(),
    };

    let rfc3339_err = match DateTime::parse_from_rfc3339(&normalized) {
        Ok(parsed) => return Ok(parsed),
        Err(err) => err,
    };
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&normalized, format) {
            return Ok(parsed);
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(parsed.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().fixed_offset());
        }
    }

    Err(TimestampError::Invalid {
        raw: raw.to_string(),
        source: rfc3339_err,
    })
}

pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&day) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Renders the wall-clock time as written; the offset itself is not shown.
pub fn render_timestamp(at: &DateTime<FixedOffset>) -> String {
    let day = at.day();
    format!(
        "{day}{} {}",
        ordinal_suffix(day),
        at.format("%B %Y - %I:%M %p UTC")
    )
}

/// Never fails: input that does not parse is logged and handed back untouched.
/// `parsed` is the UTC instant, used for ordering.
pub fn format_timestamp(raw: &str) -> FormattedTimestamp {
    match parse_timestamp(raw) {
        Ok(parsed) => FormattedTimestamp {
            display: render_timestamp(&parsed),
            parsed: Some(parsed.with_timezone(&Utc)),
        },
        Err(err) => {
            warn!(raw, error = %err, "could not convert timestamp");
            FormattedTimestamp {
                display: raw.to_string(),
                parsed: None,
            }
        }
    }
}

pub fn readable_time(raw: &str) -> String {
    format_timestamp(raw).display
}
