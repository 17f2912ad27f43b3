//! Lenient timestamp parsing for raw ingestion columns.

use crate::core::frame::{series, timestamp_column};
use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::{DataFrame, DataType};

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%Y%m%d"];

/// Parse text into a UTC timestamp.
///
/// RFC 3339 is tried first, then the common date/datetime layouts above;
/// anything else is unparsable.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Parse text using one explicit chrono format string.
///
/// Formats without a time component are accepted and map to midnight.
pub fn parse_timestamp_with(text: &str, format: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Timestamps of a column, one per row.
///
/// Datetime and date columns pass through. Text is parsed with `format` when
/// given and leniently otherwise. Nulls, unparsable text and any other dtype
/// give `None`.
pub fn parse_timestamp_column(
    frame: &DataFrame,
    name: &str,
    format: Option<&str>,
) -> Result<Vec<Option<DateTime<Utc>>>> {
    let column = series(frame, name)?;
    if column.dtype() != &DataType::String {
        return timestamp_column(frame, name);
    }
    Ok(column
        .str()?
        .into_iter()
        .map(|cell| {
            cell.and_then(|text| match format {
                Some(format) => parse_timestamp_with(text, format),
                None => parse_timestamp(text),
            })
        })
        .collect())
}
