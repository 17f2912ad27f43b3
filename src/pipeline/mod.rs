//! Pipeline entry points.
//!
//! Each stage takes its input by reference and returns a new value, so the
//! stages can be run, inspected and tested one at a time:
//!
//! ```text
//! raw ─ cleanse ─ check_continuity ─ impute ─ preprocess ─ train ─ evaluate
//!                                                            └─ extend_forecast
//! ```
//!
//! [`repair`] bundles the first three stages and re-verifies continuity.

mod forecast;
mod preprocessing;
mod repairing;
mod training;

pub use crate::data::{check_continuity, cleanse, impute, FillPolicy};
pub use crate::utils::metrics::evaluate;
pub use forecast::{extend_forecast, ACTUAL_COL, FORECAST_COL};
pub use preprocessing::{preprocess, Preprocessed};
pub use repairing::{repair, Repaired};
pub use training::{results_frame, train, train_parallel};

use serde::{Deserialize, Serialize};

/// Which columns of the input table hold time and demand, and how often
/// observations are expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub timestamp_col: String,
    pub demand_col: String,
    /// Frequency tag (`hourly`, `daily`, `weekly`, `monthly`, `quarterly`).
    pub frequency: String,
}

impl ColumnMapping {
    pub fn new(
        timestamp_col: impl Into<String>,
        demand_col: impl Into<String>,
        frequency: impl Into<String>,
    ) -> Self {
        Self {
            timestamp_col: timestamp_col.into(),
            demand_col: demand_col.into(),
            frequency: frequency.into(),
        }
    }
}
