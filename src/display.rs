//! Display helpers for record fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::record::Record;

pub const NOT_AVAILABLE: &str = "N/A";

/// Quote validity dates: `Jan 31, 2025`.
pub fn format_date(value: Option<&str>) -> String {
    format_with(value, "%b %d, %Y")
}

/// Recent-activity timestamps: `Jan 31, 2025 14:05`.
pub fn format_date_time(value: Option<&str>) -> String {
    format_with(value, "%b %d, %Y %H:%M")
}

/// Format a backend date/time, falling back to the raw text when unparseable.
fn format_with(value: Option<&str>, pattern: &str) -> String {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(pattern).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format(pattern).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.format(pattern).to_string();
        }
    }
    raw.to_string()
}

/// `first_name last_name`, skipping whichever part is missing.
pub fn display_name(record: &Record) -> String {
    [record.text("first_name"), record.text("last_name")]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
