//! Lag differencing of a demand column into a model input column.

use crate::core::frame::{float_series, numeric_column, replace_column, series};
use crate::error::{ForecastError, Result};
use crate::models::arima::lag_difference;
use polars::prelude::DataFrame;
use tracing::info;

/// Suffix appended to the demand column name for the model input column.
pub const DIFF_SUFFIX: &str = "_diff";

/// Name of the derived model input column for `demand_col`.
pub fn diff_column_name(demand_col: &str) -> String {
    format!("{demand_col}{DIFF_SUFFIX}")
}

/// Result of [`difference_column`].
#[derive(Debug, Clone)]
pub struct Differenced {
    /// Table with the derived column added.
    pub frame: DataFrame,
    /// Name of the derived column.
    pub column: String,
    /// Lag used.
    pub order: usize,
    /// Whether differencing was actually applied.
    pub applied: bool,
    /// Leading rows dropped because their lagged value does not exist.
    pub dropped_rows: usize,
}

/// Add `<demand>_diff` to `frame`.
///
/// With `apply` set, the column holds `y[t] - y[t - order]` and the first
/// `order` rows are dropped from the whole table. Otherwise it is a copy of
/// the demand column and the table keeps every row. Only one pass is taken;
/// the result is not re-tested for stationarity.
///
/// # Example
/// ```
/// use demand_forecast::core::frame::numeric_column;
/// use demand_forecast::transform::difference_column;
/// use polars::df;
///
/// let frame = df!("demand" => [1.0, 4.0, 9.0]).unwrap();
///
/// let out = difference_column(&frame, "demand", 1, true).unwrap();
/// assert_eq!(numeric_column(&out.frame, "demand_diff").unwrap(), vec![3.0, 5.0]);
/// ```
pub fn difference_column(
    frame: &DataFrame,
    demand_col: &str,
    order: usize,
    apply: bool,
) -> Result<Differenced> {
    if order == 0 {
        return Err(ForecastError::Config(
            "differencing_order must be at least 1".to_string(),
        ));
    }

    let demand = numeric_column(frame, demand_col)?;
    let column = diff_column_name(demand_col);

    if !apply {
        let copy = series(frame, demand_col)?.clone().with_name(column.as_str().into());
        return Ok(Differenced {
            frame: replace_column(frame, copy)?,
            column,
            order,
            applied: false,
            dropped_rows: 0,
        });
    }

    if demand.len() <= order {
        return Err(ForecastError::InsufficientData {
            needed: order + 1,
            got: demand.len(),
        });
    }

    let diffed = float_series(&column, &lag_difference(&demand, order));
    let trimmed = replace_column(&frame.slice(order as i64, demand.len() - order), diffed)?;

    info!(
        column = %column,
        order,
        rows = trimmed.height(),
        "applied lag differencing"
    );

    Ok(Differenced {
        frame: trimmed,
        column,
        order,
        applied: true,
        dropped_rows: order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use polars::prelude::{NamedFrom, Series};

    fn demand_frame(values: &[f64]) -> DataFrame {
        let weeks: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
        DataFrame::new(vec![
            Series::new("week".into(), weeks).into(),
            Series::new("demand".into(), values).into(),
        ])
        .unwrap()
    }

    #[test]
    fn applied_drops_leading_rows() {
        let frame = demand_frame(&[10.0, 12.0, 15.0, 11.0, 20.0]);
        let out = difference_column(&frame, "demand", 2, true).unwrap();

        assert!(out.applied);
        assert_eq!(out.dropped_rows, 2);
        assert_eq!(out.frame.height(), 3);
        assert_eq!(
            numeric_column(&out.frame, "demand_diff").unwrap(),
            vec![5.0, -1.0, 5.0]
        );
        // Other columns are trimmed in step
        assert_eq!(numeric_column(&out.frame, "week").unwrap(), vec![2.0, 3.0, 4.0]);
        assert_eq!(
            numeric_column(&out.frame, "demand").unwrap(),
            vec![15.0, 11.0, 20.0]
        );
    }

    #[test]
    fn not_applied_copies_demand() {
        let frame = demand_frame(&[3.0, 1.0, 4.0]);
        let out = difference_column(&frame, "demand", 1, false).unwrap();

        assert!(!out.applied);
        assert_eq!(out.column, "demand_diff");
        assert_eq!(out.frame.height(), 3);
        assert_eq!(
            numeric_column(&out.frame, "demand_diff").unwrap(),
            numeric_column(&out.frame, "demand").unwrap()
        );
    }

    #[test]
    fn zero_order_is_config_error() {
        let frame = demand_frame(&[1.0, 2.0]);
        assert!(matches!(
            difference_column(&frame, "demand", 0, true),
            Err(ForecastError::Config(_))
        ));
    }

    #[test]
    fn too_short_for_lag() {
        let frame = demand_frame(&[1.0, 2.0]);
        assert!(matches!(
            difference_column(&frame, "demand", 2, true),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        ));
    }

    #[test]
    fn missing_demand_column() {
        let frame = demand_frame(&[1.0, 2.0]);
        assert!(matches!(
            difference_column(&frame, "sales", 1, true),
            Err(ForecastError::MissingColumn(_))
        ));
    }
}
