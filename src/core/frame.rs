//! Typed column access over polars data frames.
//!
//! Pipeline stages exchange [`DataFrame`]s. These helpers pull typed views
//! out of a frame and build the datetime and float columns written back into
//! it, mapping polars failures onto [`ForecastError`].

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;

/// Look up a column by name.
pub fn series<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Series> {
    frame
        .column(name)
        .map(Column::as_materialized_series)
        .map_err(|_| ForecastError::MissingColumn(name.to_string()))
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Numeric view of a column.
///
/// Text is parsed leniently. Nulls, non-finite numbers and anything that is
/// not a number become NaN.
pub fn numeric_column(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = series(frame, name)?;
    let values: Vec<Option<f64>> = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .map(|text| text.and_then(|t| t.trim().parse::<f64>().ok()))
            .collect(),
        dtype if is_numeric_dtype(dtype) => series.cast(&DataType::Float64)?.f64()?.into_iter().collect(),
        _ => vec![None; series.len()],
    };
    Ok(values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()).unwrap_or(f64::NAN))
        .collect())
}

/// Timestamp view of a temporal column; nulls and non-temporal columns give `None`.
pub fn timestamp_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<DateTime<Utc>>>> {
    let series = series(frame, name)?;
    match series.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = series.cast(&DataType::Int64)?;
            Ok(raw
                .i64()?
                .into_iter()
                .map(|v| v.and_then(|v| from_epoch(v, unit)))
                .collect())
        }
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            Ok(days
                .i32()?
                .into_iter()
                .map(|d| d.and_then(|d| DateTime::from_timestamp(i64::from(d) * 86_400, 0)))
                .collect())
        }
        _ => Ok(vec![None; series.len()]),
    }
}

fn from_epoch(value: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    }
}

/// Millisecond datetime column; `None` becomes null.
pub fn datetime_series(name: &str, stamps: &[Option<DateTime<Utc>>]) -> Result<Series> {
    let millis: Vec<Option<i64>> = stamps
        .iter()
        .map(|ts| ts.map(|t| t.timestamp_millis()))
        .collect();
    Ok(Series::new(name.into(), millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?)
}

/// Float column; non-finite values become null.
pub fn float_series(name: &str, values: &[f64]) -> Series {
    let cells: Vec<Option<f64>> = values.iter().map(|v| v.is_finite().then_some(*v)).collect();
    Series::new(name.into(), cells)
}

/// Copy of `frame` with `column` added, or replacing the column of the same name.
pub fn replace_column(frame: &DataFrame, column: Series) -> Result<DataFrame> {
    let mut out = frame.clone();
    out.with_column(column)?;
    Ok(out)
}
