//! Row-level cleansing of a raw demand table.

use crate::core::frame::{datetime_series, float_series, numeric_column, replace_column};
use crate::data::timestamp::parse_timestamp_column;
use crate::error::Result;
use crate::utils::stats::mean;
use polars::prelude::*;
use tracing::{info, warn};

/// Counts of the repairs applied by [`cleanse`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleansingReport {
    /// Rows dropped because the timestamp or demand was missing/unparsable.
    pub dropped_missing: usize,
    /// Rows dropped because they repeated an earlier row.
    pub dropped_duplicates: usize,
    /// Negative demand values that were replaced.
    pub replaced_negative: usize,
    /// Value substituted for negative demand, if any replacement happened.
    pub replacement_value: Option<f64>,
}

impl CleansingReport {
    pub fn is_clean(&self) -> bool {
        self.dropped_missing == 0 && self.dropped_duplicates == 0 && self.replaced_negative == 0
    }
}

/// Output of the cleansing stage.
///
/// The timestamp column is a millisecond datetime column and demand is
/// `Float64`; other columns keep their input dtype.
#[derive(Debug, Clone)]
pub struct Cleansed {
    pub frame: DataFrame,
    pub report: CleansingReport,
}

/// Cleanse a raw table using the default timestamp layouts.
///
/// # Example
/// ```
/// use demand_forecast::core::frame::numeric_column;
/// use demand_forecast::data::cleanse;
/// use polars::df;
///
/// let raw = df!(
///     "date" => ["2024-01-01", "2024-01-02"],
///     "demand" => [-3.0, 6.0],
/// ).unwrap();
///
/// let cleansed = cleanse(&raw, "date", "demand").unwrap();
/// assert_eq!(numeric_column(&cleansed.frame, "demand").unwrap(), vec![6.0, 6.0]);
/// assert_eq!(cleansed.report.replaced_negative, 1);
/// ```
pub fn cleanse(raw: &DataFrame, timestamp_col: &str, demand_col: &str) -> Result<Cleansed> {
    cleanse_with_format(raw, timestamp_col, demand_col, None)
}

/// Cleanse a raw table, optionally with an explicit chrono timestamp format.
///
/// Steps, in order: parse timestamps and demand, drop rows missing either,
/// drop exact duplicate rows keeping the first, replace negative demand with
/// the mean of the non-negative demand.
pub fn cleanse_with_format(
    raw: &DataFrame,
    timestamp_col: &str,
    demand_col: &str,
    timestamp_format: Option<&str>,
) -> Result<Cleansed> {
    let mut report = CleansingReport::default();

    let timestamps = parse_timestamp_column(raw, timestamp_col, timestamp_format)?;
    let demand = numeric_column(raw, demand_col)?;

    let mut parsed = raw.clone();
    parsed.with_column(datetime_series(timestamp_col, &timestamps)?)?;
    parsed.with_column(float_series(demand_col, &demand))?;

    let keep: Vec<bool> = timestamps
        .iter()
        .zip(&demand)
        .map(|(ts, d)| ts.is_some() && d.is_finite())
        .collect();
    let complete = parsed.filter(&BooleanChunked::new("complete".into(), &keep))?;
    report.dropped_missing = parsed.height() - complete.height();
    if report.dropped_missing > 0 {
        warn!(
            rows = report.dropped_missing,
            "missing or unparsable timestamp/demand values found, rows dropped"
        );
    }

    let deduped = complete.unique_stable(None, UniqueKeepStrategy::First, None)?;
    report.dropped_duplicates = complete.height() - deduped.height();
    if report.dropped_duplicates > 0 {
        warn!(rows = report.dropped_duplicates, "duplicate rows found, dropped");
    }

    let values = numeric_column(&deduped, demand_col)?;
    let non_negative: Vec<f64> = values.iter().copied().filter(|v| *v >= 0.0).collect();
    report.replaced_negative = values.iter().filter(|v| **v < 0.0).count();

    let frame = if report.replaced_negative > 0 {
        let replacement = if non_negative.is_empty() {
            0.0
        } else {
            mean(&non_negative)
        };
        report.replacement_value = Some(replacement);
        warn!(
            rows = report.replaced_negative,
            replacement, "negative demand found, replaced with mean of non-negative demand"
        );
        let repaired: Vec<f64> = values
            .iter()
            .map(|&v| if v < 0.0 { replacement } else { v })
            .collect();
        replace_column(&deduped, float_series(demand_col, &repaired))?
    } else {
        deduped
    };

    info!(
        rows_in = raw.height(),
        rows_out = frame.height(),
        "cleansing complete"
    );

    Ok(Cleansed { frame, report })
}
