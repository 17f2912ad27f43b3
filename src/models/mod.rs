//! Forecasting models.

mod traits;

pub mod arima;

pub use arima::{SarimaOrder, SARIMA};
pub use traits::{Forecaster, ModelSummary};
