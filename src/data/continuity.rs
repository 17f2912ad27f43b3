//! Continuity check: does a timestamp column form a complete regular grid?

use crate::core::Frequency;
use crate::data::timestamp::parse_timestamp_column;
use crate::error::Result;
use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use tracing::{debug, warn};

/// Check whether the parsed timestamps form the full grid for `frequency`.
///
/// Missing entries and duplicates are ignored and the rest sorted before the
/// comparison, so the result only depends on the set of timestamps. Fewer
/// than two timestamps is vacuously continuous.
pub fn is_continuous(timestamps: &[Option<DateTime<Utc>>], frequency: Frequency) -> bool {
    let mut present: Vec<DateTime<Utc>> = timestamps.iter().flatten().copied().collect();
    present.sort_unstable();
    present.dedup();

    let (first, last) = match (present.first(), present.last()) {
        (Some(&first), Some(&last)) if present.len() >= 2 => (first, last),
        _ => return true,
    };

    let expected = frequency.grid(first, last);
    let continuous = expected == present;
    debug!(
        observed = present.len(),
        expected = expected.len(),
        %frequency,
        continuous,
        "continuity check"
    );
    continuous
}

/// Continuity of a frame's timestamp column for a frequency tag.
///
/// Unrecognized tags are never continuous. A missing column is an error.
pub fn check_continuity(frame: &DataFrame, timestamp_col: &str, frequency: &str) -> Result<bool> {
    let timestamps = parse_timestamp_column(frame, timestamp_col, None)?;
    let frequency = match Frequency::parse(frequency) {
        Some(freq) => freq,
        None => {
            warn!(frequency, "unrecognized frequency, treating series as discontinuous");
            return Ok(false);
        }
    };
    Ok(is_continuous(&timestamps, frequency))
}
