//! Outlier handling for demand series.
//!
//! Extreme values are not removed; they are clipped to Tukey fences so the
//! series keeps its length and positions.

pub mod outlier;

pub use outlier::{iqr_bounds, quantile, winsorize, OutlierConfig, WinsorizeResult};
