//! Wall-clock timestamps
//!
//! All persisted instants are ISO-8601 strings in the same shape as
//! JavaScript's `Date.prototype.toISOString()` (UTC, millisecond precision,
//! `Z` suffix). On wasm32 `chrono` reads the clock through `js_sys::Date`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Current instant as an ISO-8601 string, e.g. `2024-05-01T12:30:00.000Z`.
pub fn now_iso8601() -> String {
    format_iso8601(Utc::now())
}

pub fn format_iso8601(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whether `value` parses as an RFC 3339 / ISO-8601 instant.
#[cfg(test)]
pub fn is_iso8601(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
}
