//! # Cache Utilities
//!
//! HTTP-date conversion and validator header extraction.

use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{ETAG, HeaderMap, HeaderName, LAST_MODIFIED};

use crate::CacheError;
use crate::cache::types::Validators;

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

// Accepted once the leading weekday is dropped: IMF-fixdate, RFC 850, asctime
const DATE_FORMATS: [&str; 3] = [
    "%d %b %Y %H:%M:%S GMT",
    "%d-%b-%y %H:%M:%S GMT",
    "%b %e %H:%M:%S %Y",
];

/// Format a timestamp as an RFC 1123 HTTP-date in GMT
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(IMF_FIXDATE).to_string()
}

/// Parse an HTTP-date into a UTC timestamp
///
/// The weekday is redundant and not checked against the date, so origins
/// that send an inconsistent one are still honoured.
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>, CacheError> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let without_weekday = trimmed
        .split_once(',')
        .or_else(|| trimmed.split_once(' '))
        .map(|(_, rest)| rest.trim_start());

    without_weekday
        .and_then(|rest| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(rest, format).ok())
        })
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CacheError::InvalidTimestamp {
            value: value.to_string(),
            reason: "not an HTTP-date".to_string(),
        })
}

/// Extract the `Last-Modified` and `ETag` headers from a response
pub fn extract_validators(headers: &HeaderMap) -> Validators {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    Validators {
        last_modified: header(LAST_MODIFIED),
        etag: header(ETAG),
    }
}
