//! Cell value normalization.

use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime};

/// Date cells are rendered as `DD/MM/YYYY`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Converts a calamine cell to the text used for substitution.
///
/// Empty cells become `""`, dates use [`DATE_FORMAT`], integral floats drop
/// their fraction and booleans become `TRUE`/`FALSE`.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Float(value) => format_number(*value),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => bool_text(*value).to_string(),
        Data::DateTime(value) => value
            .as_datetime()
            .map(|datetime| datetime.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| format_number(value.as_f64())),
        Data::DateTimeIso(value) => normalize_date(value),
        Data::DurationIso(value) => value.clone(),
        Data::Error(error) => error.to_string(),
    }
}

/// Formats a number without a trailing `.0` when it is integral.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub(crate) fn bool_text(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Rewrites ISO dates (`2024-03-15`, `2024-03-15T10:00:00`) to
/// [`DATE_FORMAT`]. Anything else is returned unchanged.
pub fn normalize_date(text: &str) -> String {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format(DATE_FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return datetime.format(DATE_FORMAT).to_string();
        }
    }
    text.to_string()
}
