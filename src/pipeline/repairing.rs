//! Repair stage: cleansing, continuity checking and gap imputation in one call.

use crate::data::{check_continuity, cleanse, impute, CleansingReport, FillPolicy};
use crate::error::Result;
use crate::pipeline::ColumnMapping;
use polars::prelude::DataFrame;
use tracing::{info, warn};

/// Outcome of cleansing, continuity checking and gap imputation.
#[derive(Debug, Clone)]
pub struct Repaired {
    /// The cleansed and, if needed, reindexed table.
    pub frame: DataFrame,
    pub cleansing: CleansingReport,
    /// Continuity of the cleansed table before imputation.
    pub was_continuous: bool,
    /// Continuity after imputation.
    pub is_continuous: bool,
    /// Grid rows inserted by imputation.
    pub inserted: usize,
    /// Rows dropped by imputation.
    pub dropped: usize,
}

/// Cleanse `raw`, check its continuity, impute gaps and re-check.
///
/// A table that is still not continuous afterwards (for instance because the
/// frequency tag is unrecognized) is returned as is with a warning.
pub fn repair(raw: &DataFrame, mapping: &ColumnMapping, policy: FillPolicy) -> Result<Repaired> {
    let ts_col = mapping.timestamp_col.as_str();
    let demand_col = mapping.demand_col.as_str();

    let cleansed = cleanse(raw, ts_col, demand_col)?;
    let was_continuous = check_continuity(&cleansed.frame, ts_col, &mapping.frequency)?;
    let imputed = impute(
        &cleansed.frame,
        ts_col,
        demand_col,
        &mapping.frequency,
        was_continuous,
        policy,
    )?;
    let is_continuous = check_continuity(&imputed.frame, ts_col, &mapping.frequency)?;

    if is_continuous {
        info!(
            rows = imputed.frame.height(),
            inserted = imputed.inserted,
            frequency = %mapping.frequency,
            "series is continuous"
        );
    } else {
        warn!(
            rows = imputed.frame.height(),
            frequency = %mapping.frequency,
            "series is still not continuous after imputation"
        );
    }

    Ok(Repaired {
        frame: imputed.frame,
        cleansing: cleansed.report,
        was_continuous,
        is_continuous,
        inserted: imputed.inserted,
        dropped: imputed.dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::numeric_column;
    use polars::df;

    #[test]
    fn gappy_daily_table_is_repaired() {
        let raw = df!(
            "date" => ["2024-01-01", "2024-01-02", "2024-01-05", "2024-01-02"],
            "demand" => [4.0, 6.0, -2.0, 6.0],
        )
        .unwrap();

        let repaired = repair(&raw, &ColumnMapping::new("date", "demand", "daily"), FillPolicy::Zero)
            .unwrap();

        assert!(!repaired.was_continuous);
        assert!(repaired.is_continuous);
        assert_eq!(repaired.cleansing.dropped_duplicates, 1);
        assert_eq!(repaired.cleansing.replaced_negative, 1);
        assert_eq!(repaired.inserted, 2);
        assert_eq!(
            numeric_column(&repaired.frame, "demand").unwrap(),
            vec![4.0, 6.0, 0.0, 0.0, 5.0]
        );
    }

    #[test]
    fn unknown_frequency_leaves_table_alone() {
        let raw = df!(
            "date" => ["2024-01-01", "2024-01-09"],
            "demand" => [1.0, 2.0],
        )
        .unwrap();

        let repaired =
            repair(&raw, &ColumnMapping::new("date", "demand", "fortnightly"), FillPolicy::Zero)
                .unwrap();
        assert!(!repaired.is_continuous);
        assert_eq!(repaired.frame.height(), 2);
        assert_eq!(repaired.inserted, 0);
    }
}
