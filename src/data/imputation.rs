//! Gap imputation: reindex a demand table onto its complete timestamp grid.

use crate::core::frame::{datetime_series, numeric_column, replace_column, series, timestamp_column};
use crate::core::Frequency;
use crate::data::timestamp::parse_timestamp_column;
use crate::error::Result;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

/// Demand value written into rows introduced by imputation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FillPolicy {
    /// Absence of a record means no demand.
    #[default]
    Zero,
    /// Fill with a specific value.
    Constant(f64),
}

impl FillPolicy {
    pub fn value(&self) -> f64 {
        match self {
            FillPolicy::Zero => 0.0,
            FillPolicy::Constant(v) => *v,
        }
    }
}

/// Output of the imputation stage.
#[derive(Debug, Clone)]
pub struct ImputationResult {
    /// The repaired table, one row per grid tick.
    pub frame: DataFrame,
    /// Grid ticks that had no row and were inserted.
    pub inserted: usize,
    /// Input rows dropped (unparsable, duplicate or off-grid timestamps).
    pub dropped: usize,
}

impl ImputationResult {
    fn unchanged(frame: &DataFrame) -> Self {
        Self {
            frame: frame.clone(),
            inserted: 0,
            dropped: 0,
        }
    }
}

/// Reindex `frame` onto the full grid of `frequency` between its first and last timestamp.
///
/// Rows with unparsable timestamps are dropped. When a timestamp occurs more
/// than once the first row (in timestamp order) wins. Inserted rows receive the
/// fill value in `demand_col` and null in every other column; existing rows
/// with missing demand are filled the same way. Column order is preserved.
pub fn impute_gaps(
    frame: &DataFrame,
    timestamp_col: &str,
    demand_col: &str,
    frequency: Frequency,
    policy: FillPolicy,
) -> Result<ImputationResult> {
    let timestamps = parse_timestamp_column(frame, timestamp_col, None)?;
    series(frame, demand_col)?;

    let parsed = replace_column(frame, datetime_series(timestamp_col, &timestamps)?)?;
    let has_timestamp: Vec<bool> = timestamps.iter().map(Option::is_some).collect();
    let subset = [timestamp_col.to_string()];
    let ordered = parsed
        .filter(&BooleanChunked::new("parsed".into(), &has_timestamp))?
        .sort(
            [timestamp_col],
            SortMultipleOptions::default().with_maintain_order(true),
        )?
        .unique_stable(Some(&subset[..]), UniqueKeepStrategy::First, None)?;

    let present: Vec<DateTime<Utc>> = timestamp_column(&ordered, timestamp_col)?
        .into_iter()
        .flatten()
        .collect();
    let (first, last) = match (present.first(), present.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            warn!("no parsable timestamps, imputation produced an empty table");
            return Ok(ImputationResult {
                frame: frame.slice(0, 0),
                inserted: 0,
                dropped: frame.height(),
            });
        }
    };

    let grid = frequency.grid(first, last);
    let observed: HashSet<DateTime<Utc>> = present.into_iter().collect();
    let inserted = grid.iter().filter(|ts| !observed.contains(ts)).count();
    let dropped = frame.height() - (grid.len() - inserted);

    let grid_stamps: Vec<Option<DateTime<Utc>>> = grid.into_iter().map(Some).collect();
    let grid_frame = DataFrame::new(vec![datetime_series(timestamp_col, &grid_stamps)?.into()])?;
    let columns: Vec<Expr> = frame
        .get_column_names()
        .iter()
        .map(|name| col(name.as_str()))
        .collect();
    let reindexed = grid_frame
        .lazy()
        .left_join(ordered.lazy(), col(timestamp_col), col(timestamp_col))
        .sort([timestamp_col], SortMultipleOptions::default())
        .select(columns)
        .collect()?;

    let fill = policy.value();
    let filled: Vec<f64> = numeric_column(&reindexed, demand_col)?
        .into_iter()
        .map(|v| if v.is_finite() { v } else { fill })
        .collect();
    let repaired = replace_column(&reindexed, Series::new(demand_col.into(), filled))?;

    if dropped > 0 {
        warn!(rows = dropped, "rows with unparsable, duplicate or off-grid timestamps dropped");
    }
    info!(
        inserted,
        dropped,
        rows_out = repaired.height(),
        %frequency,
        fill,
        "imputation complete"
    );

    Ok(ImputationResult {
        frame: repaired,
        inserted,
        dropped,
    })
}

/// Imputation entry point driven by a continuity report and a frequency tag.
///
/// Returns an unchanged copy when the series is already continuous or the tag
/// is unrecognized.
pub fn impute(
    frame: &DataFrame,
    timestamp_col: &str,
    demand_col: &str,
    frequency: &str,
    continuous: bool,
    policy: FillPolicy,
) -> Result<ImputationResult> {
    if continuous {
        return Ok(ImputationResult::unchanged(frame));
    }
    match Frequency::parse(frequency) {
        Some(freq) => impute_gaps(frame, timestamp_col, demand_col, freq, policy),
        None => {
            warn!(frequency, "unrecognized frequency, skipping imputation");
            Ok(ImputationResult::unchanged(frame))
        }
    }
}
