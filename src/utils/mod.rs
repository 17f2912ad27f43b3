//! Utility functions for forecasting models.

pub mod cross_validation;
pub mod metrics;
pub mod ols;
pub mod optimization;
pub mod stats;

pub use cross_validation::{
    select_best, select_best_parallel, walk_forward_splits, Fold, Selection,
};
pub use metrics::{evaluate, mae, rmse, wmape, ScoreCard};
pub use ols::{ols, OlsFit};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::mean;
