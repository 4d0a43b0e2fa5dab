//! Timestamp and date parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Timestamp layouts accepted for `original_timestamp` and `extracted_date`.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts, read as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Layout of `note_date` cells.
pub const DAY_FIRST_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parses a timestamp in any accepted layout.
///
/// RFC 3339 values with an offset are converted to naive UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parses a `DD/MM/YYYY` date. No other layout is accepted.
pub fn parse_day_first_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DAY_FIRST_DATE_FORMAT).ok()
}

/// Days since the Unix epoch, the physical value of a polars `Date`.
pub fn date_to_days(date: NaiveDate) -> i32 {
    let epoch = DateTime::<Utc>::UNIX_EPOCH.date_naive();
    // Calendar dates stay far inside the i32 day range.
    (date - epoch).num_days() as i32
}

/// Milliseconds since the Unix epoch, the physical value of a `Datetime(ms)`.
pub fn datetime_to_millis(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_millis()
}
