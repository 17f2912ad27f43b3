//! Training stage: walk-forward SARIMA selection on the preprocessed demand.

use crate::config::ForecastConfig;
use crate::core::frame::series;
use crate::core::TimeSeries;
use crate::error::Result;
use crate::models::SARIMA;
use crate::pipeline::forecast::{ACTUAL_COL, FORECAST_COL};
use crate::pipeline::{ColumnMapping, Preprocessed};
use crate::utils::cross_validation::{select_best, select_best_parallel, Selection};
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::info;

/// Winsorized demand levels of the preprocessed table.
///
/// When differencing was applied the table is already trimmed by the lag, so
/// the series starts where the differenced column starts.
fn training_series(preprocessed: &Preprocessed, mapping: &ColumnMapping) -> Result<TimeSeries> {
    TimeSeries::from_frame(
        &preprocessed.frame,
        &mapping.timestamp_col,
        &mapping.demand_col,
    )
}

/// Select the best SARIMA fold by walk-forward validation on the winsorized demand.
pub fn train(
    preprocessed: &Preprocessed,
    config: &ForecastConfig,
    mapping: &ColumnMapping,
) -> Result<Selection<SARIMA>> {
    let series = training_series(preprocessed, mapping)?;
    let order = config.sarima_order();
    info!(%order, n_splits = config.splitting.n_splits, len = series.len(), "training");
    select_best(&series, config.splitting.n_splits, || SARIMA::from_order(order))
}

/// [`train`] with folds fitted concurrently. Selects the same fold.
pub fn train_parallel(
    preprocessed: &Preprocessed,
    config: &ForecastConfig,
    mapping: &ColumnMapping,
) -> Result<Selection<SARIMA>> {
    let series = training_series(preprocessed, mapping)?;
    let order = config.sarima_order();
    info!(%order, n_splits = config.splitting.n_splits, len = series.len(), "training in parallel");
    select_best_parallel(&series, config.splitting.n_splits, || {
        SARIMA::from_order(order)
    })
}

/// `[timestamp, Actual, Forecast]` rows for the winning test window.
pub fn results_frame<F>(
    preprocessed: &Preprocessed,
    selection: &Selection<F>,
    timestamp_col: &str,
) -> Result<DataFrame> {
    let test = &selection.fold.test;
    let timestamps = series(&preprocessed.frame, timestamp_col)?.slice(test.start as i64, test.len());

    Ok(DataFrame::new(vec![
        timestamps.into(),
        Series::new(ACTUAL_COL.into(), &selection.y_test).into(),
        Series::new(FORECAST_COL.into(), &selection.predictions).into(),
    ])?)
}
