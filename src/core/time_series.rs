//! TimeSeries data structure for representing a univariate demand series.

use crate::core::frame::{numeric_column, timestamp_column};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;

/// A univariate time series with strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a univariate time series.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        // Validate timestamps are strictly increasing
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        if values.len() != timestamps.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        Ok(Self { timestamps, values })
    }

    /// Build a series from two columns of a frame.
    ///
    /// Every timestamp must be present; values may not be missing.
    pub fn from_frame(frame: &DataFrame, timestamp_col: &str, value_col: &str) -> Result<Self> {
        let timestamps = timestamp_column(frame, timestamp_col)?
            .into_iter()
            .enumerate()
            .map(|(i, ts)| {
                ts.ok_or_else(|| {
                    ForecastError::TimestampError(format!(
                        "row {i} of '{timestamp_col}' is not a parsed timestamp"
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let values = numeric_column(frame, value_col)?;
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }

        Self::univariate(timestamps, values)
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get the observed values.
    pub fn primary_values(&self) -> &[f64] {
        &self.values
    }

    /// Last timestamp, if any.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Extract a slice of the time series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        })
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::datetime_series;
    use chrono::{Duration, TimeZone};
    use polars::df;
    use polars::prelude::{NamedFrom, Series};

    fn make_timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| base + Duration::days(i as i64)).collect()
    }

    #[test]
    fn univariate_basic() {
        let ts = TimeSeries::univariate(make_timestamps(3), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ts.len(), 3);
        assert!(!ts.is_empty());
        assert_eq!(ts.primary_values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn rejects_unsorted_timestamps() {
        let mut timestamps = make_timestamps(3);
        timestamps.swap(0, 1);
        let result = TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::TimestampError(_))));
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let mut timestamps = make_timestamps(3);
        timestamps[2] = timestamps[1];
        assert!(TimeSeries::univariate(timestamps, vec![1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn rejects_length_mismatch() {
        let result = TimeSeries::univariate(make_timestamps(3), vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn slice_bounds() {
        let ts = TimeSeries::univariate(make_timestamps(5), vec![1.0; 5]).unwrap();
        let sliced = ts.slice(1, 4).unwrap();
        assert_eq!(sliced.len(), 3);
        assert_eq!(sliced.timestamps()[0], ts.timestamps()[1]);
        assert!(ts.slice(3, 2).is_err());
        assert!(matches!(
            ts.slice(0, 6),
            Err(ForecastError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn from_frame_requires_parsed_timestamps() {
        let frame = df!("date" => ["2024-01-01"], "demand" => [1.0]).unwrap();
        assert!(matches!(
            TimeSeries::from_frame(&frame, "date", "demand"),
            Err(ForecastError::TimestampError(_))
        ));
    }

    #[test]
    fn from_frame_reads_columns() {
        let stamps = make_timestamps(2);
        let dates: Vec<_> = stamps.iter().copied().map(Some).collect();
        let frame = DataFrame::new(vec![
            datetime_series("date", &dates).unwrap().into(),
            Series::new("demand".into(), [4.0, 5.0]).into(),
        ])
        .unwrap();
        let ts = TimeSeries::from_frame(&frame, "date", "demand").unwrap();
        assert_eq!(ts.primary_values(), &[4.0, 5.0]);
        assert_eq!(ts.last_timestamp(), Some(stamps[1]));
    }
}
