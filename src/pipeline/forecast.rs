//! Forecast extension: the winning test window followed by future steps.

use crate::core::frame::{datetime_series, float_series, numeric_column};
use crate::core::Frequency;
use crate::data::parse_timestamp_column;
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::pipeline::Preprocessed;
use chrono::{DateTime, Utc};
use polars::prelude::{DataFrame, NamedFrom, Series};
use std::ops::Range;
use tracing::info;

/// Column holding observed values in result tables.
pub const ACTUAL_COL: &str = "Actual";
/// Column holding model output in result tables.
pub const FORECAST_COL: &str = "Forecast";

/// `[timestamp, Actual, Forecast]` table with datetime and float columns.
fn result_table(
    timestamp_col: &str,
    stamps: &[Option<DateTime<Utc>>],
    actual: Series,
    forecast: &[f64],
) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        datetime_series(timestamp_col, stamps)?.into(),
        actual.with_name(ACTUAL_COL.into()).into(),
        float_series(FORECAST_COL, forecast).into(),
    ])?)
}

/// Append `horizon` future forecast rows to the recent history.
///
/// `history` is a `[timestamp, Actual, Forecast]` table such as the one built
/// by [`results_frame`](crate::pipeline::results_frame). `model` must have been
/// fitted on the window ending where `test_range` starts; it is asked for
/// `test_range.len() + horizon` steps and the last `horizon` become the future
/// rows. Those rows are stamped at the ticks of `frequency` following the
/// latest timestamp in the test window, with `Actual` null. The returned table
/// is the last `test_range.len()` rows of `history` followed by the future rows.
pub fn extend_forecast<M: Forecaster + ?Sized>(
    history: &DataFrame,
    preprocessed: &Preprocessed,
    test_range: Range<usize>,
    timestamp_col: &str,
    frequency: &str,
    horizon: usize,
    model: &M,
) -> Result<DataFrame> {
    let frequency: Frequency = frequency.parse()?;

    if test_range.is_empty() {
        return Err(ForecastError::InvalidParameter(
            "test range must not be empty".to_string(),
        ));
    }
    if test_range.end > preprocessed.frame.height() {
        return Err(ForecastError::IndexOutOfBounds {
            index: test_range.end,
            size: preprocessed.frame.height(),
        });
    }

    let last = parse_timestamp_column(&preprocessed.frame, timestamp_col, None)?[test_range.clone()]
        .iter()
        .flatten()
        .max()
        .copied()
        .ok_or_else(|| {
            ForecastError::TimestampError("test window has no parsed timestamps".to_string())
        })?;

    let test_len = test_range.len();
    let path = model.predict(test_len + horizon)?.into_values();
    let future_values = path.get(test_len..).unwrap_or_default();

    let future_dates: Vec<_> = frequency.following(last, horizon).into_iter().map(Some).collect();
    if future_dates.len() != horizon || future_values.len() != horizon {
        return Err(ForecastError::TimestampError(format!(
            "could not produce {horizon} future {frequency} steps after {last}"
        )));
    }

    let recent = history.tail(Some(test_len));
    let mut table = result_table(
        timestamp_col,
        &parse_timestamp_column(&recent, timestamp_col, None)?,
        float_series(ACTUAL_COL, &numeric_column(&recent, ACTUAL_COL)?),
        &numeric_column(&recent, FORECAST_COL)?,
    )?;
    let future = result_table(
        timestamp_col,
        &future_dates,
        Series::new(ACTUAL_COL.into(), vec![None::<f64>; horizon]),
        future_values,
    )?;
    table.vstack_mut(&future)?;

    info!(horizon, %frequency, %last, model = model.name(), "extended forecast");
    Ok(table)
}
