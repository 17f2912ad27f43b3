//! Preprocessing stage: winsorization, stationarity testing and differencing.

use crate::config::PreprocessParams;
use crate::core::frame::{float_series, numeric_column, replace_column};
use crate::detection::{winsorize, OutlierConfig, WinsorizeResult};
use crate::error::Result;
use crate::transform::difference_column;
use crate::validation::{check_stationarity, StationarityDecision};
use polars::prelude::DataFrame;
use tracing::info;

/// Table ready for model selection, plus what was done to get there.
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Winsorized table with the derived `<demand>_diff` column added.
    ///
    /// When differencing was applied the leading rows without a lagged value
    /// are trimmed from the whole table.
    pub frame: DataFrame,
    /// Name of the derived column (`<demand>_diff`).
    pub diff_col: String,
    /// Capping bounds and count.
    pub winsorization: WinsorizeResult,
    pub stationarity: StationarityDecision,
    /// Whether the derived column holds differenced values.
    pub differenced: bool,
    /// Leading rows removed by differencing.
    pub dropped_rows: usize,
}

/// Winsorize demand, test it for stationarity and derive `<demand>_diff`.
///
/// The demand column itself is replaced by its capped values; missing cells
/// stay null. The derived column is the lag-`differencing_order` difference
/// of the capped demand when the series is found non-stationary, and a copy
/// otherwise.
pub fn preprocess(
    frame: &DataFrame,
    demand_col: &str,
    params: &PreprocessParams,
) -> Result<Preprocessed> {
    params.validate()?;

    let demand = numeric_column(frame, demand_col)?;
    let winsorization = winsorize(&demand, &OutlierConfig::iqr(params.winsorising_threshold))?;
    let capped_frame = replace_column(frame, float_series(demand_col, &winsorization.values))?;

    let stationarity = check_stationarity(&winsorization.values, params);
    let differenced = difference_column(
        &capped_frame,
        demand_col,
        params.differencing_order,
        stationarity.needs_differencing(),
    )?;

    info!(
        rows = differenced.frame.height(),
        clipped = winsorization.clipped,
        differenced = differenced.applied,
        diff_col = %differenced.column,
        "preprocessing complete"
    );

    Ok(Preprocessed {
        frame: differenced.frame,
        diff_col: differenced.column,
        winsorization,
        stationarity,
        differenced: differenced.applied,
        dropped_rows: differenced.dropped_rows,
    })
}
