//! Shared parsing utilities for incident and population sources.
//!
//! Lenient timestamp and number parsing: anything that does not parse
//! returns `None` so the caller can drop the row.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive datetime formats accepted for incident timestamps, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses an incident timestamp.
///
/// Accepts ISO-like `date time` strings with optional fractional seconds,
/// RFC 3339 strings with an offset (the local wall-clock time is kept),
/// and bare dates (midnight).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Coerces a cell to a finite number. Returns `None` for blanks,
/// non-numeric text, `NaN`, and infinities.
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    let value = s.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Coerces an optional cell to a number.
#[must_use]
pub fn parse_optional_number(s: Option<&String>) -> Option<f64> {
    parse_number(s?)
}
