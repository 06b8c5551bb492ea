//! Normalization of the timestamp strings found in upstream feeds and
//! curated submissions.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instant assigned to timestamps that could not be parsed. Sorts after
/// every real date in a newest-first listing.
pub const UNKNOWN_INSTANT: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses `raw` into a UTC instant.
///
/// Accepts RFC 3339 (trailing `Z` or explicit offset), RFC 2822, naive
/// date-times (read as UTC) and bare `YYYY-MM-DD` dates. Anything else,
/// including an empty string, yields [`UNKNOWN_INSTANT`].
pub fn normalize(raw: &str) -> DateTime<Utc> {
    try_parse(raw).unwrap_or(UNKNOWN_INSTANT)
}

fn try_parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Renders an instant as `Month DD, YYYY`.
pub fn format(instant: &DateTime<Utc>) -> String {
    instant.format("%B %d, %Y").to_string()
}

/// A published date as received, together with its normalized instant.
///
/// Serializes back to the raw string so upstream payloads round-trip
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Timestamp {
    raw: String,
    instant: DateTime<Utc>,
}

impl Timestamp {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let instant = normalize(&raw);
        Self { raw, instant }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn is_known(&self) -> bool {
        self.instant != UNKNOWN_INSTANT
    }

    /// `Month DD, YYYY` when the date parsed, otherwise the raw input.
    pub fn display(&self) -> String {
        if self.is_known() {
            format(&self.instant)
        } else {
            self.raw.clone()
        }
    }
}

impl From<String> for Timestamp {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.raw
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
