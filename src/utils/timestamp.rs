use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::utils::constants::{PRIMARY_TIMESTAMP_FORMAT, TIME_OF_DAY_FORMAT};

/// Formats tried, in order, after the primary day-first format fails.
const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parse a `last_updated` value.
///
/// The snapshot writes `dd-mm-YYYY HH:MM`; anything else goes through a set of
/// common fallbacks (ISO 8601, RFC 3339, slash dates, bare dates at midnight).
/// Unparsable input yields `None`.
pub fn parse_last_updated(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, PRIMARY_TIMESTAMP_FORMAT) {
        return Some(parsed);
    }

    for format in FALLBACK_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }

    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Render a timestamp so that [`parse_last_updated`] reads it back unchanged.
///
/// Sub-second precision is kept whenever it is present.
pub fn format_last_updated(timestamp: &NaiveDateTime) -> String {
    if timestamp.nanosecond() != 0 {
        timestamp.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    } else if timestamp.second() == 0 {
        timestamp.format(PRIMARY_TIMESTAMP_FORMAT).to_string()
    } else {
        timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Parse a local time of day such as `06:12 AM`.
///
/// Placeholders like `No moonrise` are not times and yield `None`.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_OF_DAY_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}
