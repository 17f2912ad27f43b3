//! # demand-forecast
//!
//! Repair, preprocessing and walk-forward model selection for univariate
//! demand series.
//!
//! A raw demand table is cleansed, checked for temporal continuity, reindexed
//! onto its regular grid, winsorized and, when an augmented Dickey-Fuller test
//! says so, differenced. A seasonal ARIMA is then fitted on expanding windows
//! and the fold with the lowest out-of-sample RMSE is kept.
//!
//! # Example
//!
//! ```
//! use demand_forecast::prelude::*;
//!
//! use polars::df;
//!
//! let dates: Vec<String> = (1..=28).map(|d| format!("2024-02-{d:02}")).collect();
//! let demand: Vec<f64> = (0..28)
//!     .map(|i| 20.0 + ((i * 37 + 11) % 17) as f64)
//!     .collect();
//! let raw = df!("date" => dates, "demand" => demand).unwrap();
//!
//! let mapping = ColumnMapping::new("date", "demand", "daily");
//! let repaired = repair(&raw, &mapping, FillPolicy::Zero).unwrap();
//! assert!(repaired.is_continuous);
//!
//! let config = ForecastConfig::default();
//! let prepared = preprocess(&repaired.frame, "demand", &config.params).unwrap();
//! let mut config = config;
//! config.model.params.order = [1, 0, 0];
//! config.splitting.n_splits = 3;
//! let selection = train(&prepared, &config, &mapping).unwrap();
//! let card = evaluate(&selection.y_test, &selection.predictions).unwrap();
//! assert!(card.rmse >= 0.0);
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod data;
pub mod detection;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod transform;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::{ForecastConfig, PreprocessParams};
    pub use crate::core::{Forecast, Frequency, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{Forecaster, SarimaOrder, SARIMA};
    pub use crate::pipeline::{
        evaluate, extend_forecast, preprocess, repair, results_frame, train, train_parallel,
        ColumnMapping, FillPolicy, Preprocessed,
    };
    pub use crate::utils::{ScoreCard, Selection};
    pub use polars::prelude::DataFrame;
}
